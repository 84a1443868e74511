//! Bracket engine: seeding, bracket generation, match advancement and read projections.

mod advance;
mod bracket;
mod cascade;
mod seeding;
mod setup;
mod view;

pub use advance::{advance_winner, MAX_CONFLICT_RETRIES};
pub use bracket::{
    generate_bracket, generate_double_elimination, generate_single_elimination, BracketGraph,
    Position,
};
pub use cascade::{resolve as resolve_cascade, CascadeOutcome, Decision, MatchGraph};
pub use seeding::{bracket_size, round_one_pairs, total_rounds};
pub use setup::{create_tournament, prepare_entries, MAX_ENTRY_NAME_LEN};
pub use view::{
    is_decidable, match_view, next_match_id, tournament_data, tournaments_for_owner,
    BracketRound, BracketView, MatchView, TournamentData,
};
