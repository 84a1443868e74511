//! In-memory store. A transaction holds the write lock for its whole lifetime and stages
//! its writes; `commit` applies them, dropping the transaction throws them away.

use crate::models::{
    Entry, EntryId, Match, MatchId, OwnerId, Tournament, TournamentId, TournamentStatus,
};
use crate::store::{StoreError, TournamentStore, Transaction};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug, Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    entries: HashMap<EntryId, Entry>,
    matches: HashMap<MatchId, Match>,
}

impl Tables {
    fn matches_of(&self, tournament_id: TournamentId) -> impl Iterator<Item = &Match> {
        self.matches
            .values()
            .filter(move |m| m.tournament_id == tournament_id)
    }
}

fn sort_matches(matches: &mut [Match]) {
    matches.sort_by_key(|m| (m.side, m.round, m.order));
}

/// Tournaments, entries and matches held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }
}

impl TournamentStore for MemoryStore {
    type Tx<'a>
        = MemoryTransaction<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<MemoryTransaction<'_>, StoreError> {
        let committed = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        Ok(MemoryTransaction {
            committed,
            staged: Tables::default(),
        })
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.read()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::tournament_not_found(id))
    }

    fn tournaments_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Tournament>, StoreError> {
        let mut tournaments: Vec<Tournament> = self
            .read()?
            .tournaments
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tournaments)
    }

    fn get_entries(&self, tournament_id: TournamentId) -> Result<Vec<Entry>, StoreError> {
        let mut entries: Vec<Entry> = self
            .read()?
            .entries
            .values()
            .filter(|e| e.tournament_id == tournament_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.seed);
        Ok(entries)
    }

    fn get_entry(&self, id: EntryId) -> Result<Entry, StoreError> {
        self.read()?
            .entries
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::entry_not_found(id))
    }

    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError> {
        let mut matches: Vec<Match> = self.read()?.matches_of(tournament_id).cloned().collect();
        sort_matches(&mut matches);
        Ok(matches)
    }

    fn get_match(&self, id: MatchId) -> Result<Match, StoreError> {
        self.read()?
            .matches
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::match_not_found(id))
    }
}

/// Transaction over a [`MemoryStore`]. Holds the store's write lock, so transactions are
/// fully serialized and a read-modify-write cycle can never interleave with another.
pub struct MemoryTransaction<'a> {
    committed: RwLockWriteGuard<'a, Tables>,
    staged: Tables,
}

impl MemoryTransaction<'_> {
    fn tournament(&self, id: TournamentId) -> Option<&Tournament> {
        self.staged
            .tournaments
            .get(&id)
            .or_else(|| self.committed.tournaments.get(&id))
    }

    fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.staged
            .matches
            .get(&id)
            .or_else(|| self.committed.matches.get(&id))
    }

    /// Committed matches of the tournament with staged versions layered on top.
    fn matches_of(&self, tournament_id: TournamentId) -> Vec<&Match> {
        let committed = self
            .committed
            .matches_of(tournament_id)
            .map(|m| self.staged.matches.get(&m.id).unwrap_or(m));
        let staged_only = self
            .staged
            .matches_of(tournament_id)
            .filter(|m| !self.committed.matches.contains_key(&m.id));
        committed.chain(staged_only).collect()
    }

    fn require_tournament(&self, id: TournamentId) -> Result<(), StoreError> {
        match self.tournament(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::tournament_not_found(id)),
        }
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn get_tournament(&mut self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.tournament(id)
            .cloned()
            .ok_or_else(|| StoreError::tournament_not_found(id))
    }

    fn get_match_for_update(&mut self, id: MatchId) -> Result<Match, StoreError> {
        self.find_match(id)
            .cloned()
            .ok_or_else(|| StoreError::match_not_found(id))
    }

    fn has_pending_before(&mut self, m: &Match) -> Result<bool, StoreError> {
        Ok(self
            .matches_of(m.tournament_id)
            .into_iter()
            .any(|earlier| earlier.blocks(m)))
    }

    fn update_match(&mut self, m: &Match) -> Result<(), StoreError> {
        if self.find_match(m.id).is_none() {
            return Err(StoreError::match_not_found(m.id));
        }
        self.staged.matches.insert(m.id, m.clone());
        Ok(())
    }

    fn create_tournament(&mut self, tournament: &Tournament) -> Result<(), StoreError> {
        if self.tournament(tournament.id).is_some() {
            return Err(StoreError::Duplicate {
                kind: "Tournament",
                id: tournament.id,
            });
        }
        self.staged
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn create_entries(&mut self, entries: &[Entry]) -> Result<(), StoreError> {
        for entry in entries {
            self.require_tournament(entry.tournament_id)?;
            let exists = self.staged.entries.contains_key(&entry.id)
                || self.committed.entries.contains_key(&entry.id);
            if exists {
                return Err(StoreError::Duplicate {
                    kind: "Entry",
                    id: entry.id,
                });
            }
            self.staged.entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    fn create_matches(&mut self, matches: &[Match]) -> Result<(), StoreError> {
        for m in matches {
            self.require_tournament(m.tournament_id)?;
            if self.find_match(m.id).is_some() {
                return Err(StoreError::Duplicate {
                    kind: "Match",
                    id: m.id,
                });
            }
            self.staged.matches.insert(m.id, m.clone());
        }
        Ok(())
    }

    fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), StoreError> {
        let mut tournament = self.get_tournament(id)?;
        tournament.status = status;
        self.staged.tournaments.insert(id, tournament);
        Ok(())
    }

    fn commit(mut self) -> Result<(), StoreError> {
        let staged = std::mem::take(&mut self.staged);
        self.committed.tournaments.extend(staged.tournaments);
        self.committed.entries.extend(staged.entries);
        self.committed.matches.extend(staged.matches);
        Ok(())
    }
}
