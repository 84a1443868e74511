//! Match advancement: decide a match and propagate the result through the bracket in a
//! single transaction.

use crate::logic::cascade::{self, Decision, MatchGraph};
use crate::models::{
    EntryId, Match, MatchId, Slot, TournamentError, TournamentId, TournamentStatus,
};
use crate::store::{StoreError, TournamentStore, Transaction};

/// How many times a transaction that hit a write conflict is re-run before giving up.
pub const MAX_CONFLICT_RETRIES: usize = 3;

/// Declare `winner` the winner of `match_id`.
///
/// Validates play order and the winner, finishes the match, seats the winner (and, in double
/// elimination, the loser) in their next matches and resolves any bye that becomes decidable.
/// Deciding the terminal match completes the tournament. Either everything is written or
/// nothing is.
pub fn advance_winner<S: TournamentStore>(
    store: &S,
    match_id: MatchId,
    winner: EntryId,
) -> Result<TournamentId, TournamentError> {
    with_conflict_retry(|| {
        let mut tx = store.begin()?;
        let tournament_id = advance_in(&mut tx, match_id, winner)?;
        tx.commit()?;
        Ok(tournament_id)
    })
}

/// Re-run `op` while it fails with a transaction conflict, up to [`MAX_CONFLICT_RETRIES`] times.
pub(crate) fn with_conflict_retry<T>(
    mut op: impl FnMut() -> Result<T, TournamentError>,
) -> Result<T, TournamentError> {
    let mut retries = 0;
    loop {
        match op() {
            Err(TournamentError::Persistence(StoreError::Conflict))
                if retries < MAX_CONFLICT_RETRIES =>
            {
                retries += 1;
                log::warn!(
                    "Transaction conflict, retrying ({}/{})",
                    retries,
                    MAX_CONFLICT_RETRIES
                );
            }
            result => return result,
        }
    }
}

fn advance_in<T: Transaction>(
    tx: &mut T,
    match_id: MatchId,
    winner: EntryId,
) -> Result<TournamentId, TournamentError> {
    let m = tx.get_match_for_update(match_id)?;
    let slot = validate(tx, &m, winner)?;

    let outcome = cascade::resolve(&mut TxGraph(&mut *tx), Decision { match_id, slot })?;
    log::debug!(
        "Advanced match {}: {} match(es) decided",
        match_id,
        outcome.decided.len()
    );

    if outcome.completed {
        tx.update_tournament_status(m.tournament_id, TournamentStatus::Completed)?;
        log::info!("Tournament {} completed", m.tournament_id);
    }
    Ok(m.tournament_id)
}

/// Checks a human decision on `m`, returning the winner's slot.
fn validate<T: Transaction>(tx: &mut T, m: &Match, winner: EntryId) -> Result<Slot, TournamentError> {
    if m.is_finished() {
        return Err(TournamentError::AlreadyDecided);
    }
    if !m.is_bye {
        if tx.has_pending_before(m)? {
            return Err(TournamentError::OutOfOrder);
        }
        if !m.is_ready() {
            return Err(TournamentError::MatchNotReady);
        }
    }
    m.slot_of(winner).ok_or(TournamentError::InvalidWinner)
}

/// Cascade access through an open transaction.
struct TxGraph<'t, T>(&'t mut T);

impl<T: Transaction> MatchGraph for TxGraph<'_, T> {
    type Error = StoreError;

    fn load_match(&mut self, id: MatchId) -> Result<Match, StoreError> {
        self.0.get_match_for_update(id)
    }

    fn save_match(&mut self, m: &Match) -> Result<(), StoreError> {
        self.0.update_match(m)
    }
}
