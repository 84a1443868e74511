//! Worklist propagation of decided matches: record the winner, seat winner and loser in
//! their next matches, and keep going through any bye that becomes resolvable.
//!
//! Shared by bracket generation (in memory) and the advancement engine (inside a store
//! transaction).

use crate::models::{EntryId, Match, MatchId, Slot, Target};

/// Load/save access to match nodes, either an in-memory graph or a store transaction.
pub trait MatchGraph {
    type Error;

    fn load_match(&mut self, id: MatchId) -> Result<Match, Self::Error>;

    fn save_match(&mut self, m: &Match) -> Result<(), Self::Error>;
}

/// A match to be finished in favour of the entry seated in `slot`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Decision {
    pub match_id: MatchId,
    pub slot: Slot,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CascadeOutcome {
    /// Matches finished by this cascade, in processing order.
    pub decided: Vec<MatchId>,
    /// A match without a winner target was finished.
    pub completed: bool,
}

/// Apply `first` and everything it makes resolvable.
///
/// Runs as an explicit stack rather than recursion; each bye is pushed at most once because
/// it only becomes resolvable when its single participant arrives.
pub fn resolve<G: MatchGraph>(graph: &mut G, first: Decision) -> Result<CascadeOutcome, G::Error> {
    let mut outcome = CascadeOutcome::default();
    let mut stack = vec![first];

    while let Some(Decision { match_id, slot }) = stack.pop() {
        let mut m = graph.load_match(match_id)?;
        if m.is_finished() {
            log::debug!("Match {} already finished, skipping", m.id);
            continue;
        }
        let Some(winner) = m.entry(slot) else {
            log::warn!("Match {} has no entry in the winning slot, skipping", m.id);
            continue;
        };
        let loser = m.entry(slot.other());

        m.finish(slot);
        graph.save_match(&m)?;
        outcome.decided.push(m.id);
        log::debug!(
            "Match {} ({:?} round {} #{}) won by {}{}",
            m.id,
            m.side,
            m.round,
            m.order,
            winner,
            if m.is_bye { " (bye)" } else { "" }
        );

        match m.winner_next {
            Some(target) => {
                if let Some(next) = seat(graph, target, winner)? {
                    stack.push(next);
                }
            }
            None => outcome.completed = true,
        }

        if let (Some(target), Some(loser)) = (m.loser_next, loser) {
            if let Some(next) = seat(graph, target, loser)? {
                stack.push(next);
            }
        }
    }

    Ok(outcome)
}

/// Put `entry` into its target slot. Returns the target's decision if it is a bye that can
/// now resolve.
fn seat<G: MatchGraph>(
    graph: &mut G,
    target: Target,
    entry: EntryId,
) -> Result<Option<Decision>, G::Error> {
    let mut next = graph.load_match(target.match_id)?;
    next.set_entry(target.slot, entry);
    graph.save_match(&next)?;
    Ok(next.pending_bye_slot().map(|slot| Decision {
        match_id: next.id,
        slot,
    }))
}
