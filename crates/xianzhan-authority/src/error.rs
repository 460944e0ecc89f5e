//! Error types for the authority boundary.

use thiserror::Error;
use xianzhan_core::{BattleError, BattleId, CombatantId};

use crate::authority::ActorToken;

/// Why the authority refused a request.
///
/// A refused request never changes any battle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthorityError {
    /// No battle is registered under that id.
    #[error("unknown battle {0}")]
    UnknownBattle(BattleId),

    /// The token holds no seat in that battle.
    #[error("token '{token}' has no seat in battle {battle}")]
    UnknownToken {
        /// The battle addressed.
        battle: BattleId,
        /// The presented token.
        token: ActorToken,
    },

    /// The token's side is not the one being awaited.
    #[error("not the turn of '{token}' (awaiting {awaiting:?})")]
    NotYourTurn {
        /// The presented token.
        token: ActorToken,
        /// The unit whose decision is pending, if any.
        awaiting: Option<CombatantId>,
    },

    /// A battle with that id is already registered.
    #[error("battle {0} is already registered")]
    DuplicateBattle(BattleId),

    /// The engine rejected the request.
    #[error(transparent)]
    Rejected(#[from] BattleError),
}
