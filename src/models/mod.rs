//! Data structures for elimination brackets: tournaments, entries, matches.

mod embed;
mod entry;
mod game;
mod tournament;

pub use embed::{EmbedInfo, EmbedKind};
pub use entry::{Entry, EntryId, EntryInput};
pub use game::{BracketSide, Match, MatchId, MatchStatus, Slot, Target};
pub use tournament::{
    OwnerId, Tournament, TournamentError, TournamentId, TournamentStatus, TournamentType,
};
