//! Match (game), its slots and forward links within the bracket graph.

use crate::models::entry::EntryId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which sub-bracket a match belongs to. Ordering is winners, losers, finals.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    Finals,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Finished,
}

/// One of the two seats in a match. Serialized as `1` or `2`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Odd match orders feed slot 1 of their parent, even orders feed slot 2.
    pub fn from_parity(order: u32) -> Slot {
        if order % 2 == 1 {
            Slot::One
        } else {
            Slot::Two
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        match slot {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(format!("slot must be 1 or 2, got {other}")),
        }
    }
}

/// Where a match sends one of its participants next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub match_id: MatchId,
    pub slot: Slot,
}

impl Target {
    pub fn new(match_id: MatchId, slot: Slot) -> Self {
        Self { match_id, slot }
    }
}

/// A single match node in the bracket graph.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub side: BracketSide,
    /// 1-based round within `side`.
    pub round: u32,
    /// 1-based position within (`side`, `round`).
    pub order: u32,
    /// None until seeded or filled by propagation.
    pub entry_1: Option<EntryId>,
    pub entry_2: Option<EntryId>,
    pub score_1: u32,
    pub score_2: u32,
    pub status: MatchStatus,
    /// Set exactly when `status` is `Finished`.
    pub winner_slot: Option<Slot>,
    /// None only for the terminal match of the tournament.
    pub winner_next: Option<Target>,
    /// Only winners-side matches of a double-elimination bracket carry one.
    pub loser_next: Option<Target>,
    /// Fewer than two participants will ever reach this match; resolved without a decision.
    pub is_bye: bool,
}

impl Match {
    pub fn new(tournament_id: TournamentId, side: BracketSide, round: u32, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            side,
            round,
            order,
            entry_1: None,
            entry_2: None,
            score_1: 0,
            score_2: 0,
            status: MatchStatus::Pending,
            winner_slot: None,
            winner_next: None,
            loser_next: None,
            is_bye: false,
        }
    }

    pub fn entry(&self, slot: Slot) -> Option<EntryId> {
        match slot {
            Slot::One => self.entry_1,
            Slot::Two => self.entry_2,
        }
    }

    pub fn set_entry(&mut self, slot: Slot, entry: EntryId) {
        match slot {
            Slot::One => self.entry_1 = Some(entry),
            Slot::Two => self.entry_2 = Some(entry),
        }
    }

    /// The slot `entry` is seated in, if any.
    pub fn slot_of(&self, entry: EntryId) -> Option<Slot> {
        if self.entry_1 == Some(entry) {
            Some(Slot::One)
        } else if self.entry_2 == Some(entry) {
            Some(Slot::Two)
        } else {
            None
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Both slots are populated.
    pub fn is_ready(&self) -> bool {
        self.entry_1.is_some() && self.entry_2.is_some()
    }

    pub fn is_winner(&self, slot: Slot) -> bool {
        self.is_finished() && self.winner_slot == Some(slot)
    }

    pub fn is_loser(&self, slot: Slot) -> bool {
        self.is_finished() && self.winner_slot == Some(slot.other())
    }

    pub fn winner(&self) -> Option<EntryId> {
        self.winner_slot.and_then(|slot| self.entry(slot))
    }

    pub fn loser(&self) -> Option<EntryId> {
        self.winner_slot.and_then(|slot| self.entry(slot.other()))
    }

    /// Mark the match decided in favour of `slot`.
    pub fn finish(&mut self, slot: Slot) {
        self.status = MatchStatus::Finished;
        self.winner_slot = Some(slot);
    }

    /// Slot of the sole occupant when this is an undecided bye whose participant has arrived.
    pub fn pending_bye_slot(&self) -> Option<Slot> {
        if !self.is_bye || self.is_finished() {
            return None;
        }
        match (self.entry_1, self.entry_2) {
            (Some(_), None) => Some(Slot::One),
            (None, Some(_)) => Some(Slot::Two),
            _ => None,
        }
    }

    /// Same side and strictly earlier by (round, order).
    pub fn precedes(&self, other: &Match) -> bool {
        self.tournament_id == other.tournament_id
            && self.side == other.side
            && (self.round, self.order) < (other.round, other.order)
    }

    /// Whether this match, still awaiting a human decision, must be decided before `other`.
    /// Byes never block: they have no decision point and resolve as their participant arrives.
    pub fn blocks(&self, other: &Match) -> bool {
        !self.is_bye && !self.is_finished() && self.precedes(other)
    }
}
