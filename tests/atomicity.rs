//! A failed write anywhere in an operation leaves the store untouched; conflicts are retried.

use bracket_tournament_web::{
    advance_winner, create_tournament, tournament_data, tournaments_for_owner, BracketSide, Entry,
    EntryId, EntryInput, Match, MatchId, MemoryStore, OwnerId, StoreError, Tournament,
    TournamentError, TournamentId, TournamentStatus, TournamentStore, TournamentType,
    Transaction,
};
use bracket_tournament_web::store::MemoryTransaction;
use std::cell::Cell;
use uuid::Uuid;

/// Wraps a [`MemoryStore`] and injects failures into its transactions.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    /// Fail the n-th `update_match` call (1-based) of the next transactions.
    fail_update_at: Cell<Option<usize>>,
    fail_status_update: Cell<bool>,
    fail_create_matches: Cell<bool>,
    /// Number of commits still to be rejected with a conflict.
    conflicts: Cell<usize>,
    commits: Cell<usize>,
}

struct FlakyTx<'a> {
    inner: MemoryTransaction<'a>,
    store: &'a FlakyStore,
    updates: usize,
}

fn injected() -> StoreError {
    StoreError::Backend("injected failure".to_string())
}

impl Transaction for FlakyTx<'_> {
    fn get_tournament(&mut self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.inner.get_tournament(id)
    }

    fn get_match_for_update(&mut self, id: MatchId) -> Result<Match, StoreError> {
        self.inner.get_match_for_update(id)
    }

    fn has_pending_before(&mut self, m: &Match) -> Result<bool, StoreError> {
        self.inner.has_pending_before(m)
    }

    fn update_match(&mut self, m: &Match) -> Result<(), StoreError> {
        self.updates += 1;
        if self.store.fail_update_at.get() == Some(self.updates) {
            return Err(injected());
        }
        self.inner.update_match(m)
    }

    fn create_tournament(&mut self, tournament: &Tournament) -> Result<(), StoreError> {
        self.inner.create_tournament(tournament)
    }

    fn create_entries(&mut self, entries: &[Entry]) -> Result<(), StoreError> {
        self.inner.create_entries(entries)
    }

    fn create_matches(&mut self, matches: &[Match]) -> Result<(), StoreError> {
        if self.store.fail_create_matches.get() {
            return Err(injected());
        }
        self.inner.create_matches(matches)
    }

    fn update_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), StoreError> {
        if self.store.fail_status_update.get() {
            return Err(injected());
        }
        self.inner.update_tournament_status(id, status)
    }

    fn commit(self) -> Result<(), StoreError> {
        self.store.commits.set(self.store.commits.get() + 1);
        let pending = self.store.conflicts.get();
        if pending > 0 {
            self.store.conflicts.set(pending - 1);
            return Err(StoreError::Conflict);
        }
        self.inner.commit()
    }
}

impl TournamentStore for FlakyStore {
    type Tx<'a>
        = FlakyTx<'a>
    where
        Self: 'a;

    fn begin(&self) -> Result<FlakyTx<'_>, StoreError> {
        Ok(FlakyTx {
            inner: self.inner.begin()?,
            store: self,
            updates: 0,
        })
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.inner.get_tournament(id)
    }

    fn tournaments_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Tournament>, StoreError> {
        self.inner.tournaments_by_owner(owner_id)
    }

    fn get_entries(&self, tournament_id: TournamentId) -> Result<Vec<Entry>, StoreError> {
        self.inner.get_entries(tournament_id)
    }

    fn get_entry(&self, id: EntryId) -> Result<Entry, StoreError> {
        self.inner.get_entry(id)
    }

    fn get_matches(&self, tournament_id: TournamentId) -> Result<Vec<Match>, StoreError> {
        self.inner.get_matches(tournament_id)
    }

    fn get_match(&self, id: MatchId) -> Result<Match, StoreError> {
        self.inner.get_match(id)
    }
}

fn inputs(n: usize) -> Vec<EntryInput> {
    (1..=n).map(|i| EntryInput::new(format!("E{i}"))).collect()
}

fn find(store: &FlakyStore, id: TournamentId, side: BracketSide, round: u32, order: u32) -> Match {
    tournament_data(store, id)
        .unwrap()
        .matches
        .into_iter()
        .find(|m| m.side == side && m.round == round && m.order == order)
        .unwrap()
}

#[test]
fn failure_mid_cascade_discards_every_write() {
    let store = FlakyStore::default();
    let id = create_tournament(&store, Uuid::new_v4(), "Cup", TournamentType::Double, &inputs(5))
        .unwrap();
    let before = tournament_data(&store, id).unwrap();
    let w1_2 = find(&store, id, BracketSide::Winners, 1, 2);
    let seed_4 = before.entries[3].id;

    // Deciding winners 1-2 writes it, winners 2-1, losers 1-1 (twice) and losers 2-1.
    for fail_at in 1..=5 {
        store.fail_update_at.set(Some(fail_at));
        let result = advance_winner(&store, w1_2.id, seed_4);
        assert_eq!(
            result,
            Err(TournamentError::Persistence(injected())),
            "failing write {fail_at}"
        );
        let after = tournament_data(&store, id).unwrap();
        assert_eq!(before.matches, after.matches, "failing write {fail_at}");
    }

    store.fail_update_at.set(None);
    advance_winner(&store, w1_2.id, seed_4).unwrap();
    let l2_1 = find(&store, id, BracketSide::Losers, 2, 1);
    assert_eq!(l2_1.entry_1, Some(before.entries[4].id));
}

#[test]
fn failed_completion_leaves_final_undecided() {
    let store = FlakyStore::default();
    let id = create_tournament(&store, Uuid::new_v4(), "Cup", TournamentType::Single, &inputs(2))
        .unwrap();
    let only = find(&store, id, BracketSide::Winners, 1, 1);
    let winner = only.entry_1.unwrap();

    store.fail_status_update.set(true);
    assert!(matches!(
        advance_winner(&store, only.id, winner),
        Err(TournamentError::Persistence(StoreError::Backend(_)))
    ));
    let data = tournament_data(&store, id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Started);
    assert!(!data.matches[0].is_finished());
    assert_eq!(data.next_match_id, Some(only.id));

    store.fail_status_update.set(false);
    advance_winner(&store, only.id, winner).unwrap();
    let data = tournament_data(&store, id).unwrap();
    assert_eq!(data.tournament.status, TournamentStatus::Completed);
}

#[test]
fn failed_creation_persists_nothing() {
    let store = FlakyStore::default();
    let owner = Uuid::new_v4();
    store.fail_create_matches.set(true);

    let result = create_tournament(&store, owner, "Cup", TournamentType::Single, &inputs(4));
    assert!(matches!(result, Err(TournamentError::Persistence(_))));
    assert!(tournaments_for_owner(&store, owner).unwrap().is_empty());
}

#[test]
fn conflicts_are_retried() {
    let store = FlakyStore::default();
    let id = create_tournament(&store, Uuid::new_v4(), "Cup", TournamentType::Single, &inputs(4))
        .unwrap();
    let m1 = find(&store, id, BracketSide::Winners, 1, 1);

    store.commits.set(0);
    store.conflicts.set(2);
    assert_eq!(advance_winner(&store, m1.id, m1.entry_1.unwrap()), Ok(id));
    assert_eq!(store.commits.get(), 3);
    assert!(find(&store, id, BracketSide::Winners, 1, 1).is_finished());
}

#[test]
fn conflicts_give_up_after_retry_limit() {
    let store = FlakyStore::default();
    let id = create_tournament(&store, Uuid::new_v4(), "Cup", TournamentType::Single, &inputs(4))
        .unwrap();
    let before = tournament_data(&store, id).unwrap();
    let m1 = find(&store, id, BracketSide::Winners, 1, 1);

    store.commits.set(0);
    store.conflicts.set(10);
    assert_eq!(
        advance_winner(&store, m1.id, m1.entry_1.unwrap()),
        Err(TournamentError::Persistence(StoreError::Conflict))
    );
    // One attempt plus three retries.
    assert_eq!(store.commits.get(), 4);
    assert_eq!(before.matches, tournament_data(&store, id).unwrap().matches);
}
