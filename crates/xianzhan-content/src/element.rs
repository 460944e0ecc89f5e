//! The five elements and their advantage matrix.
//!
//! Every skill and every combatant carries an [`Element`]. When a damaging
//! skill lands, the [`ElementMatrix`] decides whether the attacker's element
//! overcomes the defender's (x1.5), is overcome by it (x0.7) or neither (x1.0).
//!
//! The default matrix is the overcoming cycle:
//!
//! ```text
//! Metal -> Wood -> Earth -> Water -> Fire -> Metal
//! ```
//!
//! where each element beats the one it points at. [`Element::Neutral`] sits
//! outside the cycle and is even against everything.
//!
//! # Example
//!
//! ```
//! use xianzhan_content::element::{Element, ElementMatrix, Relation};
//!
//! let matrix = ElementMatrix::default();
//! assert_eq!(matrix.relation(Element::Water, Element::Fire), Relation::Advantage);
//! assert!((matrix.multiplier(Element::Fire, Element::Water) - 0.7).abs() < f64::EPSILON);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Elemental affinity of a skill or combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// Metal (jin).
    Metal,
    /// Wood (mu).
    Wood,
    /// Water (shui).
    Water,
    /// Fire (huo).
    Fire,
    /// Earth (tu).
    Earth,
    /// No affinity; even against every element.
    #[default]
    Neutral,
}

impl Element {
    /// The five cyclic elements in table order.
    pub const CYCLE: [Element; 5] = [
        Element::Metal,
        Element::Wood,
        Element::Water,
        Element::Fire,
        Element::Earth,
    ];

    /// Row/column of this element in the matrix, `None` for `Neutral`.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Metal => Some(0),
            Self::Wood => Some(1),
            Self::Water => Some(2),
            Self::Fire => Some(3),
            Self::Earth => Some(4),
            Self::Neutral => None,
        }
    }

    /// The element this one overcomes in the classic cycle.
    #[must_use]
    pub const fn overcomes(self) -> Option<Element> {
        match self {
            Self::Metal => Some(Self::Wood),
            Self::Wood => Some(Self::Earth),
            Self::Earth => Some(Self::Water),
            Self::Water => Some(Self::Fire),
            Self::Fire => Some(Self::Metal),
            Self::Neutral => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metal => write!(f, "Metal"),
            Self::Wood => write!(f, "Wood"),
            Self::Water => write!(f, "Water"),
            Self::Fire => write!(f, "Fire"),
            Self::Earth => write!(f, "Earth"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// How an attacking element fares against a defending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The attacker overcomes the defender.
    Advantage,
    /// The defender overcomes the attacker.
    Disadvantage,
    /// Neither overcomes the other.
    #[default]
    Even,
}

/// 5x5 elemental advantage table plus the multipliers it produces.
///
/// Rows are attackers, columns are defenders, both indexed by
/// [`Element::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementMatrix {
    /// Relation table, `table[attacker][defender]`.
    pub table: [[Relation; 5]; 5],
    /// Multiplier for [`Relation::Advantage`].
    pub advantage: f64,
    /// Multiplier for [`Relation::Disadvantage`].
    pub disadvantage: f64,
}

impl ElementMatrix {
    /// Multiplier for an advantageous matchup.
    pub const ADVANTAGE: f64 = 1.5;
    /// Multiplier for a disadvantageous matchup.
    pub const DISADVANTAGE: f64 = 0.7;

    /// Builds the classic overcoming cycle with the standard multipliers.
    #[must_use]
    pub fn overcoming_cycle() -> Self {
        let mut table = [[Relation::Even; 5]; 5];
        for attacker in Element::CYCLE {
            if let (Some(a), Some(beaten)) = (attacker.index(), attacker.overcomes()) {
                if let Some(d) = beaten.index() {
                    table[a][d] = Relation::Advantage;
                    table[d][a] = Relation::Disadvantage;
                }
            }
        }
        Self {
            table,
            advantage: Self::ADVANTAGE,
            disadvantage: Self::DISADVANTAGE,
        }
    }

    /// Returns the relation of `attacker` against `defender`.
    ///
    /// Either side being [`Element::Neutral`] yields [`Relation::Even`].
    #[must_use]
    pub fn relation(&self, attacker: Element, defender: Element) -> Relation {
        match (attacker.index(), defender.index()) {
            (Some(a), Some(d)) => self.table[a][d],
            _ => Relation::Even,
        }
    }

    /// Returns the damage multiplier for `attacker` hitting `defender`.
    #[must_use]
    pub fn multiplier(&self, attacker: Element, defender: Element) -> f64 {
        self.multiplier_for(self.relation(attacker, defender))
    }

    /// Returns the damage multiplier for a relation.
    #[must_use]
    pub fn multiplier_for(&self, relation: Relation) -> f64 {
        match relation {
            Relation::Advantage => self.advantage,
            Relation::Disadvantage => self.disadvantage,
            Relation::Even => 1.0,
        }
    }

    /// Checks that the table is antisymmetric and the multipliers positive.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.advantage <= 0.0 || self.disadvantage <= 0.0 {
            return Err("element multipliers must be positive".to_string());
        }
        for a in 0..5 {
            if self.table[a][a] != Relation::Even {
                return Err(format!("{} must be even against itself", Element::CYCLE[a]));
            }
            for d in 0..5 {
                let mirrored = match self.table[a][d] {
                    Relation::Advantage => Relation::Disadvantage,
                    Relation::Disadvantage => Relation::Advantage,
                    Relation::Even => Relation::Even,
                };
                if self.table[d][a] != mirrored {
                    return Err(format!(
                        "relation {} vs {} is not mirrored",
                        Element::CYCLE[a],
                        Element::CYCLE[d]
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for ElementMatrix {
    fn default() -> Self {
        Self::overcoming_cycle()
    }
}
