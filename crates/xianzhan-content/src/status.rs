//! Status kinds: the closed set of buffs and debuffs a skill can apply.
//!
//! Status effects are identified by [`StatusKind`] rather than by free-form
//! strings, so the refresh rule (same kind refreshes, never stacks) is checked
//! by the compiler. Each kind knows statically:
//!
//! - its [`Polarity`] (buff or debuff)
//! - the [`Stat`] it modifies, if any
//! - whether it ticks every turn (damage or healing over time)
//! - its [`CrowdControl`] flags (stun, freeze)

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a status helps or hinders its bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Beneficial effect.
    Buff,
    /// Harmful effect.
    Debuff,
}

/// A combat stat that percentage modifiers can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Offensive power.
    Attack,
    /// Damage mitigation.
    Defense,
    /// Initiative.
    Speed,
}

bitflags! {
    /// Crowd-control flags carried by a status.
    ///
    /// Any debuff with a non-empty set of flags consumes its bearer's turn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CrowdControl: u8 {
        /// Dazed by a heavy blow.
        const STUN = 0b0000_0001;
        /// Sealed in ice.
        const FREEZE = 0b0000_0010;
    }
}

/// Every status a skill can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Raises attack by `magnitude` percent.
    AttackUp,
    /// Raises defense by `magnitude` percent.
    DefenseUp,
    /// Raises speed by `magnitude` percent.
    SpeedUp,
    /// Restores `magnitude` hp at the start of each turn.
    Regeneration,
    /// Lowers attack by `magnitude` percent.
    AttackDown,
    /// Lowers defense by `magnitude` percent.
    DefenseDown,
    /// Lowers speed by `magnitude` percent.
    SpeedDown,
    /// Deals `magnitude` fire damage at the start of each turn.
    Burn,
    /// Deals `magnitude` damage at the start of each turn.
    Poison,
    /// Skips the bearer's turns.
    Stun,
    /// Skips the bearer's turns.
    Freeze,
}

impl StatusKind {
    /// All kinds, buffs first.
    pub const ALL: [StatusKind; 11] = [
        StatusKind::AttackUp,
        StatusKind::DefenseUp,
        StatusKind::SpeedUp,
        StatusKind::Regeneration,
        StatusKind::AttackDown,
        StatusKind::DefenseDown,
        StatusKind::SpeedDown,
        StatusKind::Burn,
        StatusKind::Poison,
        StatusKind::Stun,
        StatusKind::Freeze,
    ];

    /// Returns whether this kind is a buff or a debuff.
    #[must_use]
    pub const fn polarity(self) -> Polarity {
        match self {
            Self::AttackUp | Self::DefenseUp | Self::SpeedUp | Self::Regeneration => {
                Polarity::Buff
            }
            Self::AttackDown
            | Self::DefenseDown
            | Self::SpeedDown
            | Self::Burn
            | Self::Poison
            | Self::Stun
            | Self::Freeze => Polarity::Debuff,
        }
    }

    /// Returns the stat this kind scales, with the sign of the change.
    ///
    /// The sign is `+1` for increases and `-1` for decreases.
    #[must_use]
    pub const fn modifies(self) -> Option<(Stat, i8)> {
        match self {
            Self::AttackUp => Some((Stat::Attack, 1)),
            Self::DefenseUp => Some((Stat::Defense, 1)),
            Self::SpeedUp => Some((Stat::Speed, 1)),
            Self::AttackDown => Some((Stat::Attack, -1)),
            Self::DefenseDown => Some((Stat::Defense, -1)),
            Self::SpeedDown => Some((Stat::Speed, -1)),
            Self::Regeneration | Self::Burn | Self::Poison | Self::Stun | Self::Freeze => None,
        }
    }

    /// Returns `true` if this kind deals damage every turn.
    #[must_use]
    pub const fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Burn | Self::Poison)
    }

    /// Returns `true` if this kind heals every turn.
    #[must_use]
    pub const fn is_heal_over_time(self) -> bool {
        matches!(self, Self::Regeneration)
    }

    /// Returns the crowd-control flags of this kind.
    #[must_use]
    pub const fn crowd_control(self) -> CrowdControl {
        match self {
            Self::Stun => CrowdControl::STUN,
            Self::Freeze => CrowdControl::FREEZE,
            _ => CrowdControl::empty(),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AttackUp => "Attack Up",
            Self::DefenseUp => "Defense Up",
            Self::SpeedUp => "Speed Up",
            Self::Regeneration => "Regeneration",
            Self::AttackDown => "Attack Down",
            Self::DefenseDown => "Defense Down",
            Self::SpeedDown => "Speed Down",
            Self::Burn => "Burn",
            Self::Poison => "Poison",
            Self::Stun => "Stun",
            Self::Freeze => "Freeze",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffs_come_first_in_all() {
        let first_debuff = StatusKind::ALL
            .iter()
            .position(|k| k.polarity() == Polarity::Debuff)
            .unwrap();
        assert!(StatusKind::ALL[first_debuff..]
            .iter()
            .all(|k| k.polarity() == Polarity::Debuff));
    }

    #[test]
    fn only_stun_and_freeze_carry_crowd_control() {
        for kind in StatusKind::ALL {
            let cc = kind.crowd_control();
            match kind {
                StatusKind::Stun => assert_eq!(cc, CrowdControl::STUN),
                StatusKind::Freeze => assert_eq!(cc, CrowdControl::FREEZE),
                _ => assert!(cc.is_empty(), "{kind} should not disable"),
            }
        }
    }

    #[test]
    fn periodic_kinds_match_polarity() {
        for kind in StatusKind::ALL {
            if kind.is_damage_over_time() {
                assert_eq!(kind.polarity(), Polarity::Debuff);
            }
            if kind.is_heal_over_time() {
                assert_eq!(kind.polarity(), Polarity::Buff);
            }
        }
    }

    #[test]
    fn modifier_sign_follows_polarity() {
        for kind in StatusKind::ALL {
            if let Some((_, sign)) = kind.modifies() {
                let expected = if kind.polarity() == Polarity::Buff { 1 } else { -1 };
                assert_eq!(sign, expected, "{kind}");
            }
        }
    }

    #[test]
    fn kinds_serialize_as_snake_case() {
        let json = serde_json::to_string(&StatusKind::AttackDown).unwrap();
        assert_eq!(json, "\"attack_down\"");
    }
}
