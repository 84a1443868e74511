//! Bracket generation: single- and double-elimination match graphs, seeded, with byes
//! resolved before anything is persisted.

use crate::logic::cascade::{self, Decision, MatchGraph};
use crate::logic::seeding::{bracket_size, round_one_pairs, total_rounds};
use crate::models::{
    BracketSide, Entry, Match, MatchId, Slot, Target, TournamentError, TournamentId,
    TournamentType,
};
use crate::store::StoreError;
use std::collections::{BTreeMap, HashMap};

/// Place of a match in the bracket. Orders by side, then round, then order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Position {
    pub side: BracketSide,
    pub round: u32,
    pub order: u32,
}

impl Position {
    pub fn new(side: BracketSide, round: u32, order: u32) -> Self {
        Self { side, round, order }
    }

    fn of(m: &Match) -> Self {
        Self::new(m.side, m.round, m.order)
    }
}

/// A complete match graph held in memory, keyed by position.
#[derive(Clone, Debug)]
pub struct BracketGraph {
    tournament_id: TournamentId,
    matches: BTreeMap<Position, Match>,
    positions: HashMap<MatchId, Position>,
}

impl BracketGraph {
    fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            matches: BTreeMap::new(),
            positions: HashMap::new(),
        }
    }

    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, side: BracketSide, round: u32, order: u32) -> Option<&Match> {
        self.matches.get(&Position::new(side, round, order))
    }

    pub fn by_id(&self, id: MatchId) -> Option<&Match> {
        self.positions.get(&id).and_then(|pos| self.matches.get(pos))
    }

    /// All matches ordered by side, round, then order.
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Matches of one round, in order.
    pub fn round(&self, side: BracketSide, round: u32) -> impl Iterator<Item = &Match> {
        self.matches
            .range(Position::new(side, round, 1)..Position::new(side, round + 1, 1))
            .map(|(_, m)| m)
    }

    /// Highest round number on `side`, 0 when the side is empty.
    pub fn rounds(&self, side: BracketSide) -> u32 {
        self.matches
            .keys()
            .filter(|pos| pos.side == side)
            .map(|pos| pos.round)
            .max()
            .unwrap_or(0)
    }

    pub fn into_matches(self) -> Vec<Match> {
        self.matches.into_values().collect()
    }

    fn insert(&mut self, m: Match) -> MatchId {
        let id = m.id;
        let pos = Position::of(&m);
        self.positions.insert(id, pos);
        self.matches.insert(pos, m);
        id
    }

    fn id_at(&self, side: BracketSide, round: u32, order: u32) -> Option<MatchId> {
        self.get(side, round, order).map(|m| m.id)
    }

    fn get_mut(&mut self, side: BracketSide, round: u32, order: u32) -> Option<&mut Match> {
        self.matches.get_mut(&Position::new(side, round, order))
    }
}

impl MatchGraph for BracketGraph {
    type Error = StoreError;

    fn load_match(&mut self, id: MatchId) -> Result<Match, StoreError> {
        self.by_id(id)
            .cloned()
            .ok_or_else(|| StoreError::match_not_found(id))
    }

    fn save_match(&mut self, m: &Match) -> Result<(), StoreError> {
        let pos = self
            .positions
            .get(&m.id)
            .copied()
            .ok_or_else(|| StoreError::match_not_found(m.id))?;
        self.matches.insert(pos, m.clone());
        Ok(())
    }
}

/// Build the bracket for `kind`. Entries are seeded by their `seed` field.
pub fn generate_bracket(
    tournament_id: TournamentId,
    kind: TournamentType,
    entries: &[Entry],
) -> Result<BracketGraph, TournamentError> {
    match kind {
        TournamentType::Single => generate_single_elimination(tournament_id, entries),
        TournamentType::Double => generate_double_elimination(tournament_id, entries),
    }
}

/// Single elimination. Fewer than two entries produce an empty graph.
pub fn generate_single_elimination(
    tournament_id: TournamentId,
    entries: &[Entry],
) -> Result<BracketGraph, TournamentError> {
    let mut graph = BracketGraph::new(tournament_id);
    let size = bracket_size(entries.len());
    if size < 2 {
        return Ok(graph);
    }

    build_winners(&mut graph, total_rounds(size), None);
    seat_round_one(&mut graph, entries, size);
    mark_byes(&mut graph);
    resolve_byes(&mut graph)?;
    Ok(graph)
}

/// Double elimination: winners bracket, losers bracket and a single grand final.
pub fn generate_double_elimination(
    tournament_id: TournamentId,
    entries: &[Entry],
) -> Result<BracketGraph, TournamentError> {
    let required = TournamentType::Double.minimum_entries();
    if entries.len() < required {
        return Err(TournamentError::NotEnoughEntries {
            required,
            provided: entries.len(),
        });
    }

    let mut graph = BracketGraph::new(tournament_id);
    let size = bracket_size(entries.len());
    let rounds = total_rounds(size);

    let grand_final = graph.insert(Match::new(tournament_id, BracketSide::Finals, 1, 1));
    build_winners(
        &mut graph,
        rounds,
        Some(Target::new(grand_final, Slot::One)),
    );
    build_losers(&mut graph, size, rounds, grand_final);
    route_losers(&mut graph, size, rounds, grand_final);
    seat_round_one(&mut graph, entries, size);
    mark_byes(&mut graph);
    resolve_byes(&mut graph)?;
    Ok(graph)
}

/// Winners bracket, built from the final backwards. Match `i` of a round feeds match
/// `ceil(i/2)` of the next round, slot by parity. The final forwards to `champion`.
fn build_winners(graph: &mut BracketGraph, rounds: u32, champion: Option<Target>) {
    let tournament_id = graph.tournament_id;
    for round in (1..=rounds).rev() {
        let count = 1u32 << (rounds - round);
        for order in 1..=count {
            let mut m = Match::new(tournament_id, BracketSide::Winners, round, order);
            m.winner_next = if round == rounds {
                champion
            } else {
                graph
                    .id_at(BracketSide::Winners, round + 1, (order + 1) / 2)
                    .map(|parent| Target::new(parent, Slot::from_parity(order)))
            };
            graph.insert(m);
        }
    }
}

/// Matches in losers round `round` of a bracket with `size` slots. Rounds come in pairs of
/// equal size: the odd round plays losers-bracket survivors against each other (round 1:
/// winners round 1 losers), the even round meets the next wave dropping from the winners side.
fn losers_round_size(size: usize, round: u32) -> u32 {
    let wave = (round + 1) / 2;
    (size >> (wave + 1)) as u32
}

/// Losers bracket: `2 * (rounds - 1)` rounds. Odd rounds forward straight across into
/// slot 1, even rounds halve the field; the last round forwards to grand final slot 2.
fn build_losers(graph: &mut BracketGraph, size: usize, rounds: u32, grand_final: MatchId) {
    let tournament_id = graph.tournament_id;
    let losers_rounds = 2 * rounds.saturating_sub(1);
    for round in (1..=losers_rounds).rev() {
        for order in 1..=losers_round_size(size, round) {
            let mut m = Match::new(tournament_id, BracketSide::Losers, round, order);
            m.winner_next = if round == losers_rounds {
                Some(Target::new(grand_final, Slot::Two))
            } else if round % 2 == 1 {
                graph
                    .id_at(BracketSide::Losers, round + 1, order)
                    .map(|next| Target::new(next, Slot::One))
            } else {
                graph
                    .id_at(BracketSide::Losers, round + 1, (order + 1) / 2)
                    .map(|next| Target::new(next, Slot::from_parity(order)))
            };
            graph.insert(m);
        }
    }
}

/// Loser targets for every winners-side match.
///
/// Round 1 losers pair up in losers round 1. Losers of winners round `r > 1` drop into slot 2
/// of losers round `2 * (r - 1)` in reversed order, so a dropped player does not meet the
/// opponent they just lost to. With a single winners round the loser goes to grand final slot 2.
fn route_losers(graph: &mut BracketGraph, size: usize, rounds: u32, grand_final: MatchId) {
    for round in 1..=rounds {
        let count = (size >> round) as u32;
        for order in 1..=count {
            let target = if rounds == 1 {
                Some(Target::new(grand_final, Slot::Two))
            } else if round == 1 {
                graph
                    .id_at(BracketSide::Losers, 1, (order + 1) / 2)
                    .map(|id| Target::new(id, Slot::from_parity(order)))
            } else {
                graph
                    .id_at(BracketSide::Losers, 2 * (round - 1), count - order + 1)
                    .map(|id| Target::new(id, Slot::Two))
            };
            if let Some(m) = graph.get_mut(BracketSide::Winners, round, order) {
                m.loser_next = target;
            }
        }
    }
}

/// Seat entries into winners round 1. Slot index `k` holds the entry seeded `k + 1`;
/// indices past the last entry stay empty.
fn seat_round_one(graph: &mut BracketGraph, entries: &[Entry], size: usize) {
    let mut seeded: Vec<&Entry> = entries.iter().collect();
    seeded.sort_by_key(|e| e.seed);

    for (i, (a, b)) in round_one_pairs(size).into_iter().enumerate() {
        if let Some(m) = graph.get_mut(BracketSide::Winners, 1, i as u32 + 1) {
            m.entry_1 = seeded.get(a).map(|e| e.id);
            m.entry_2 = seeded.get(b).map(|e| e.id);
        }
    }
}

/// Count, for every match, how many of its two feeds will ever deliver a participant, and
/// mark matches with fewer than two as byes.
///
/// Positions iterate winners rounds, then losers rounds, then finals, which is a topological
/// order of the forward links. A match delivers a winner if it has any live feed and a loser
/// only if both feeds are live. Matches that can never produce a loser lose their loser target.
fn mark_byes(graph: &mut BracketGraph) {
    let mut live: HashMap<MatchId, u8> = graph
        .round(BracketSide::Winners, 1)
        .map(|m| (m.id, u8::from(m.entry_1.is_some()) + u8::from(m.entry_2.is_some())))
        .collect();

    let positions: Vec<Position> = graph.matches.keys().copied().collect();
    for pos in positions {
        let Some(m) = graph.matches.get_mut(&pos) else {
            continue;
        };
        let feeds = live.get(&m.id).copied().unwrap_or(0);
        m.is_bye = feeds < 2;
        if feeds < 2 {
            m.loser_next = None;
        }

        let winner_next = m.winner_next.filter(|_| feeds >= 1);
        let loser_next = m.loser_next;
        for target in winner_next.into_iter().chain(loser_next) {
            *live.entry(target.match_id).or_insert(0) += 1;
        }
    }
}

/// Resolve every bye whose participant is already seated, following the cascade forward so
/// nothing persisted ever shows a bye as pending.
fn resolve_byes(graph: &mut BracketGraph) -> Result<(), TournamentError> {
    let ready: Vec<Decision> = graph
        .iter()
        .filter_map(|m| {
            m.pending_bye_slot().map(|slot| Decision {
                match_id: m.id,
                slot,
            })
        })
        .collect();

    for decision in ready {
        let outcome = cascade::resolve(graph, decision)?;
        log::debug!(
            "Bye {} resolved {} match(es) at generation",
            decision.match_id,
            outcome.decided.len()
        );
    }
    Ok(())
}
