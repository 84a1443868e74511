//! Read projections for rendering: tournament data, match view, bracket columns.

use crate::models::{
    BracketSide, Entry, Match, MatchId, OwnerId, Tournament, TournamentError, TournamentId,
};
use crate::store::TournamentStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything needed to render one tournament.
#[derive(Clone, Debug, Serialize)]
pub struct TournamentData {
    pub tournament: Tournament,
    /// Ordered by seed.
    pub entries: Vec<Entry>,
    /// Ordered by side, round, then order.
    pub matches: Vec<Match>,
    /// The match to highlight as up next.
    pub next_match_id: Option<MatchId>,
}

pub fn tournament_data<S: TournamentStore>(
    store: &S,
    id: TournamentId,
) -> Result<TournamentData, TournamentError> {
    let tournament = store.get_tournament(id)?;
    let entries = store.get_entries(id)?;
    let matches = store.get_matches(id)?;
    let next_match_id = next_match_id(&matches);
    Ok(TournamentData {
        tournament,
        entries,
        matches,
        next_match_id,
    })
}

/// Tournaments owned by `owner_id`, newest first.
pub fn tournaments_for_owner<S: TournamentStore>(
    store: &S,
    owner_id: OwnerId,
) -> Result<Vec<Tournament>, TournamentError> {
    Ok(store.tournaments_by_owner(owner_id)?)
}

/// Whether a human could decide `m` right now: not finished, not a bye, both participants
/// seated and nothing earlier on its side still waiting. Mirrors the advancement checks.
pub fn is_decidable(m: &Match, matches: &[Match]) -> bool {
    !m.is_finished()
        && !m.is_bye
        && m.is_ready()
        && !matches.iter().any(|earlier| earlier.blocks(m))
}

/// First decidable match by round, then order (winners before losers before finals on ties).
pub fn next_match_id(matches: &[Match]) -> Option<MatchId> {
    matches
        .iter()
        .filter(|m| is_decidable(m, matches))
        .min_by_key(|m| (m.round, m.order, m.side))
        .map(|m| m.id)
}

/// One match with its seated entries.
#[derive(Clone, Debug, Serialize)]
pub struct MatchView {
    #[serde(rename = "match")]
    pub game: Match,
    pub entry_1: Option<Entry>,
    pub entry_2: Option<Entry>,
    pub next_match_id: Option<MatchId>,
}

pub fn match_view<S: TournamentStore>(
    store: &S,
    match_id: MatchId,
) -> Result<MatchView, TournamentError> {
    let game = store.get_match(match_id)?;
    let entry_1 = game.entry_1.map(|id| store.get_entry(id)).transpose()?;
    let entry_2 = game.entry_2.map(|id| store.get_entry(id)).transpose()?;
    let matches = store.get_matches(game.tournament_id)?;
    Ok(MatchView {
        next_match_id: next_match_id(&matches),
        game,
        entry_1,
        entry_2,
    })
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BracketRound {
    pub round: u32,
    pub matches: Vec<Match>,
}

/// Matches grouped into columns: one list of rounds per bracket side.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BracketView {
    pub winners: Vec<BracketRound>,
    pub losers: Vec<BracketRound>,
    pub finals: Vec<BracketRound>,
}

impl BracketView {
    pub fn from_matches(matches: &[Match]) -> Self {
        Self {
            winners: group_rounds(matches, BracketSide::Winners),
            losers: group_rounds(matches, BracketSide::Losers),
            finals: group_rounds(matches, BracketSide::Finals),
        }
    }
}

fn group_rounds(matches: &[Match], side: BracketSide) -> Vec<BracketRound> {
    let mut rounds: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.side == side) {
        rounds.entry(m.round).or_default().push(m.clone());
    }
    rounds
        .into_iter()
        .map(|(round, mut matches)| {
            matches.sort_by_key(|m| m.order);
            BracketRound { round, matches }
        })
        .collect()
}
