//! Persistence boundary: tournaments, entries and matches behind an atomic transaction.

mod memory;

pub use memory::{MemoryStore, MemoryTransaction};

use crate::models::{
    Entry, EntryId, Match, MatchId, OwnerId, Tournament, TournamentId, TournamentStatus,
};
use thiserror::Error;
use uuid::Uuid;

/// Store failures.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },
    #[error("{kind} already exists: {id}")]
    Duplicate { kind: &'static str, id: Uuid },
    /// Concurrent write detected; the whole transaction may be retried.
    #[error("transaction conflict")]
    Conflict,
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn tournament_not_found(id: TournamentId) -> Self {
        StoreError::NotFound {
            kind: "Tournament",
            id,
        }
    }

    pub(crate) fn match_not_found(id: MatchId) -> Self {
        StoreError::NotFound { kind: "Match", id }
    }

    pub(crate) fn entry_not_found(id: EntryId) -> Self {
        StoreError::NotFound { kind: "Entry", id }
    }
}

/// One atomic unit of work. Dropping a transaction without calling `commit` discards
/// every write made through it.
pub trait Transaction {
    fn get_tournament(&mut self, id: TournamentId) -> Result<Tournament, StoreError>;

    /// Load a match for modification within this transaction.
    fn get_match_for_update(&mut self, id: MatchId) -> Result<Match, StoreError>;

    /// Whether an undecided match must be decided before `m` (see [`Match::blocks`]).
    fn has_pending_before(&mut self, m: &Match) -> Result<bool, StoreError>;

    fn update_match(&mut self, m: &Match) -> Result<(), StoreError>;

    fn create_tournament(&mut self, tournament: &Tournament) -> Result<(), StoreError>;

    fn create_entries(&mut self, entries: &[Entry]) -> Result<(), StoreError>;

    fn create_matches(&mut self, matches: &[Match]) -> Result<(), StoreError>;

    fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}

/// Read paths plus the entry point for transactions.
pub trait TournamentStore {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;

    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    /// Newest first.
    fn tournaments_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Tournament>, StoreError>;

    /// Ordered by seed.
    fn get_entries(&self, tournament_id: TournamentId) -> Result<Vec<Entry>, StoreError>;

    fn get_entry(&self, id: EntryId) -> Result<Entry, StoreError>;

    /// Ordered by side, round, then order.
    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError>;

    fn get_match(&self, id: MatchId) -> Result<Match, StoreError>;
}
