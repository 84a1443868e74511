//! Entry: a participant seeded into a bracket.

use crate::models::embed::EmbedInfo;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entry (used in match slots and lookups).
pub type EntryId = Uuid;

/// A participant in one tournament. Immutable once the bracket is created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub tournament_id: TournamentId,
    pub name: String,
    /// 1-based, dense and unique within the tournament.
    pub seed: u32,
    /// Optional media link shown alongside the entry.
    pub embed_link: Option<String>,
}

impl Entry {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        seed: u32,
        embed_link: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            seed,
            embed_link,
        }
    }

    /// How the entry's media link should be embedded.
    pub fn embed(&self) -> EmbedInfo {
        EmbedInfo::from_link(self.embed_link.as_deref())
    }
}

/// An entry as submitted by the organiser, before validation and seeding.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntryInput {
    pub name: String,
    #[serde(default)]
    pub embed_link: Option<String>,
}

impl EntryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            embed_link: None,
        }
    }

    pub fn with_embed_link(mut self, link: impl Into<String>) -> Self {
        self.embed_link = Some(link.into());
        self
    }
}
