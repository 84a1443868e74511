//! Elimination bracket organizer: library with models, the bracket engine and its store.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::ServerConfig;
pub use logic::{
    advance_winner, bracket_size, create_tournament, generate_bracket, match_view,
    next_match_id, round_one_pairs, tournament_data, tournaments_for_owner, BracketGraph,
    BracketView, MatchView, TournamentData,
};
pub use models::{
    BracketSide, EmbedInfo, EmbedKind, Entry, EntryId, EntryInput, Match, MatchId, MatchStatus,
    OwnerId, Slot, Target, Tournament, TournamentError, TournamentId, TournamentStatus,
    TournamentType,
};
pub use store::{MemoryStore, StoreError, TournamentStore, Transaction};
