//! Error types for catalog lookups, validation and loading.

use thiserror::Error;

use crate::skill::SkillId;
use crate::template::TemplateId;

/// Errors raised while loading, validating or querying a [`ContentCatalog`].
///
/// A missing template or skill is always a hard failure. Encounter setup must
/// abort rather than substitute some other template.
///
/// [`ContentCatalog`]: crate::catalog::ContentCatalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// A combatant template id was referenced but is not in the catalog.
    #[error("combatant template '{0}' not found")]
    TemplateNotFound(TemplateId),

    /// A skill id was referenced but is not in the catalog.
    #[error("skill '{0}' not found")]
    SkillNotFound(SkillId),

    /// A skill definition violates a structural rule.
    #[error("skill '{skill}' is invalid: {reason}")]
    InvalidSkill {
        /// The offending skill.
        skill: SkillId,
        /// Human readable explanation.
        reason: String,
    },

    /// A template definition violates a structural rule.
    #[error("template '{template}' is invalid: {reason}")]
    InvalidTemplate {
        /// The offending template.
        template: TemplateId,
        /// Human readable explanation.
        reason: String,
    },

    /// The catalog source could not be parsed.
    #[error("failed to parse content: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
