//! Tournament, its status and type, and the errors bracket operations return.

use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Identifier of the user who owns a tournament.
pub type OwnerId = Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Fewer entries than the bracket type needs.
    #[error("Need at least {required} entries for this bracket type (got {provided})")]
    NotEnoughEntries { required: usize, provided: usize },
    /// Entry name longer than the allowed maximum.
    #[error("Entry name '{name}' exceeds {max} characters")]
    InvalidEntryName { name: String, max: usize },
    /// An earlier match on the same bracket side is still undecided.
    #[error("Matches must be decided in order")]
    OutOfOrder,
    /// The declared winner is not seated in the match.
    #[error("Winner is not part of this match")]
    InvalidWinner,
    /// The match already has a winner; results are final.
    #[error("Match has already been decided")]
    AlreadyDecided,
    /// One of the slots is still waiting for its participant.
    #[error("Match is still waiting for an opponent")]
    MatchNotReady,
    /// Unknown tournament, match or entry id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },
    /// The store failed; nothing was written.
    #[error("Persistence failure: {0}")]
    Persistence(StoreError),
}

impl TournamentError {
    /// Message safe to show to the caller. Store failures are replaced by a generic message.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::NotFound { kind, .. } => format!("{kind} not found"),
            TournamentError::Persistence(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Errors the caller can fix by changing the request.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            TournamentError::NotFound { .. } | TournamentError::Persistence(_)
        )
    }
}

impl From<StoreError> for TournamentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => TournamentError::NotFound { kind, id },
            other => TournamentError::Persistence(other),
        }
    }
}

/// Lifecycle of a tournament. Only moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    /// Bracket generated; matches are being decided.
    Started,
    /// The terminal match has been decided.
    Completed,
}

/// Bracket topology.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    #[default]
    Single,
    Double,
}

impl TournamentType {
    /// Entries needed to build a bracket of this type.
    pub fn minimum_entries(self) -> usize {
        match self {
            TournamentType::Single => 1,
            TournamentType::Double => 2,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub owner_id: OwnerId,
    pub name: String,
    pub status: TournamentStatus,
    #[serde(rename = "type")]
    pub kind: TournamentType,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament that is ready to be played (its bracket is generated alongside).
    pub fn new(owner_id: OwnerId, name: impl Into<String>, kind: TournamentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            status: TournamentStatus::Started,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }
}
