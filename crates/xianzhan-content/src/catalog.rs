//! The read-only content catalog consumed by the engine.
//!
//! The catalog holds skill definitions, combatant templates and the element
//! matrix. It is loaded once (from JSON or built in code), validated, and then
//! shared immutably by every battle that references it.
//!
//! Lookups are strict: an unknown id is a [`ContentError`], never a silent
//! fallback to some other entry.
//!
//! # Example
//!
//! ```
//! use xianzhan_content::catalog::ContentCatalog;
//! use xianzhan_content::skill::{SkillCategory, SkillDef};
//! use xianzhan_content::template::CombatantTemplate;
//!
//! let catalog = ContentCatalog::new()
//!     .with_skill(SkillDef::new("jab", "Jab", SkillCategory::Attack))
//!     .with_template(CombatantTemplate::new("monk", "Monk").with_skill("jab"));
//!
//! assert!(catalog.validate().is_ok());
//! assert!(catalog.template(&"monk".into()).is_ok());
//! assert!(catalog.template(&"ghost".into()).is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::ElementMatrix;
use crate::error::ContentError;
use crate::skill::{SkillDef, SkillId};
use crate::template::{CombatantTemplate, TemplateId};

/// On-disk shape of a catalog: plain lists, keyed on load.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogSource {
    #[serde(default)]
    elements: ElementMatrix,
    #[serde(default)]
    skills: Vec<SkillDef>,
    #[serde(default)]
    templates: Vec<CombatantTemplate>,
}

/// Skill definitions, combatant templates and the element matrix.
///
/// Entries are stored in `BTreeMap`s so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentCatalog {
    skills: BTreeMap<SkillId, SkillDef>,
    templates: BTreeMap<TemplateId, CombatantTemplate>,
    elements: ElementMatrix,
}

impl ContentCatalog {
    /// Creates an empty catalog with the default element matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Parse`] for malformed JSON or duplicate ids,
    /// and any validation error from [`ContentCatalog::validate`].
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let source: CatalogSource = serde_json::from_str(json)?;

        let mut catalog = Self {
            elements: source.elements,
            ..Self::default()
        };
        for skill in source.skills {
            if catalog.skills.contains_key(&skill.id) {
                return Err(ContentError::Parse(format!("duplicate skill id '{}'", skill.id)));
            }
            catalog.skills.insert(skill.id.clone(), skill);
        }
        for template in source.templates {
            if catalog.templates.contains_key(&template.id) {
                return Err(ContentError::Parse(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }
            catalog.templates.insert(template.id.clone(), template);
        }

        catalog.validate()?;
        debug!(
            skills = catalog.skills.len(),
            templates = catalog.templates.len(),
            "content catalog loaded"
        );
        Ok(catalog)
    }

    /// Serializes the catalog back to its JSON list form.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ContentError> {
        let source = CatalogSource {
            elements: self.elements.clone(),
            skills: self.skills.values().cloned().collect(),
            templates: self.templates.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&source)?)
    }

    /// Adds or replaces a skill definition.
    #[must_use]
    pub fn with_skill(mut self, skill: SkillDef) -> Self {
        self.insert_skill(skill);
        self
    }

    /// Adds or replaces a template.
    #[must_use]
    pub fn with_template(mut self, template: CombatantTemplate) -> Self {
        self.insert_template(template);
        self
    }

    /// Replaces the element matrix.
    #[must_use]
    pub fn with_elements(mut self, elements: ElementMatrix) -> Self {
        self.elements = elements;
        self
    }

    /// Adds or replaces a skill definition in place.
    pub fn insert_skill(&mut self, skill: SkillDef) {
        self.skills.insert(skill.id.clone(), skill);
    }

    /// Adds or replaces a template in place.
    pub fn insert_template(&mut self, template: CombatantTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    /// Looks up a template.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::TemplateNotFound`] for unknown ids.
    pub fn template(&self, id: &TemplateId) -> Result<&CombatantTemplate, ContentError> {
        self.templates
            .get(id)
            .ok_or_else(|| ContentError::TemplateNotFound(id.clone()))
    }

    /// Looks up a skill.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::SkillNotFound`] for unknown ids.
    pub fn skill(&self, id: &SkillId) -> Result<&SkillDef, ContentError> {
        self.skills
            .get(id)
            .ok_or_else(|| ContentError::SkillNotFound(id.clone()))
    }

    /// Returns the element matrix.
    #[must_use]
    pub fn elements(&self) -> &ElementMatrix {
        &self.elements
    }

    /// Iterates over skills in id order.
    pub fn skills(&self) -> impl Iterator<Item = &SkillDef> + '_ {
        self.skills.values()
    }

    /// Iterates over templates in id order.
    pub fn templates(&self) -> impl Iterator<Item = &CombatantTemplate> + '_ {
        self.templates.values()
    }

    /// Checks every entry and every cross-reference.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an invalid skill, an invalid
    /// template, a template referencing an unknown skill, or a malformed
    /// element matrix.
    pub fn validate(&self) -> Result<(), ContentError> {
        self.elements.check().map_err(ContentError::Parse)?;

        for skill in self.skills.values() {
            skill.check().map_err(|reason| ContentError::InvalidSkill {
                skill: skill.id.clone(),
                reason,
            })?;
        }

        for template in self.templates.values() {
            template
                .check()
                .map_err(|reason| ContentError::InvalidTemplate {
                    template: template.id.clone(),
                    reason,
                })?;
            for skill in &template.skills {
                if !self.skills.contains_key(skill) {
                    return Err(ContentError::SkillNotFound(skill.clone()));
                }
            }
        }
        Ok(())
    }
}
