//! Tournament creation: validate entries, generate the bracket, persist everything at once.

use crate::logic::advance::with_conflict_retry;
use crate::logic::bracket::generate_bracket;
use crate::models::{
    Entry, EntryInput, OwnerId, Tournament, TournamentError, TournamentId, TournamentType,
};
use crate::store::{TournamentStore, Transaction};

/// Longest entry name accepted.
pub const MAX_ENTRY_NAME_LEN: usize = 50;

/// Turn raw inputs into seeded entries: names are trimmed, blank names skipped, seeds
/// assigned 1..N in input order, blank embed links dropped.
pub fn prepare_entries(
    tournament_id: TournamentId,
    inputs: &[EntryInput],
) -> Result<Vec<Entry>, TournamentError> {
    let mut entries = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input.name.trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_ENTRY_NAME_LEN {
            return Err(TournamentError::InvalidEntryName {
                name: name.to_string(),
                max: MAX_ENTRY_NAME_LEN,
            });
        }
        let embed_link = input
            .embed_link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        let seed = entries.len() as u32 + 1;
        entries.push(Entry::new(tournament_id, name, seed, embed_link));
    }
    Ok(entries)
}

/// Create a tournament with its entries and fully wired bracket in one transaction.
/// Byes are already resolved in what gets persisted.
pub fn create_tournament<S: TournamentStore>(
    store: &S,
    owner_id: OwnerId,
    name: &str,
    kind: TournamentType,
    inputs: &[EntryInput],
) -> Result<TournamentId, TournamentError> {
    let tournament = Tournament::new(owner_id, name.trim(), kind);
    let entries = prepare_entries(tournament.id, inputs)?;

    let required = kind.minimum_entries();
    if entries.len() < required {
        return Err(TournamentError::NotEnoughEntries {
            required,
            provided: entries.len(),
        });
    }

    let matches = generate_bracket(tournament.id, kind, &entries)?.into_matches();

    with_conflict_retry(|| {
        let mut tx = store.begin()?;
        tx.create_tournament(&tournament)?;
        tx.create_entries(&entries)?;
        tx.create_matches(&matches)?;
        tx.commit()?;
        Ok(())
    })?;

    log::info!(
        "Created {:?} elimination tournament {} with {} entries and {} matches",
        kind,
        tournament.id,
        entries.len(),
        matches.len()
    );
    Ok(tournament.id)
}
