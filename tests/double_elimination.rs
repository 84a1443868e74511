//! Double-elimination bracket generation: losers routing and bye propagation.

use bracket_tournament_web::logic::{generate_double_elimination, BracketGraph};
use bracket_tournament_web::{
    advance_winner, create_tournament, tournament_data, BracketSide, Entry, EntryInput, Match,
    MatchStatus, MemoryStore, Slot, TournamentData, TournamentError, TournamentId,
    TournamentType,
};
use std::collections::HashMap;
use uuid::Uuid;

fn seeded_entries(tournament_id: TournamentId, n: usize) -> Vec<Entry> {
    (0..n)
        .map(|i| Entry::new(tournament_id, format!("E{}", i + 1), i as u32 + 1, None))
        .collect()
}

fn find(data: &TournamentData, side: BracketSide, round: u32, order: u32) -> Match {
    data.matches
        .iter()
        .find(|m| m.side == side && m.round == round && m.order == order)
        .cloned()
        .unwrap()
}

fn create(store: &MemoryStore, n: usize) -> TournamentData {
    let inputs: Vec<EntryInput> = (1..=n).map(|i| EntryInput::new(format!("E{i}"))).collect();
    let id = create_tournament(store, Uuid::new_v4(), "Double", TournamentType::Double, &inputs)
        .unwrap();
    tournament_data(store, id).unwrap()
}

#[test]
fn double_elimination_needs_two_entries() {
    let tid = Uuid::new_v4();
    assert!(matches!(
        generate_double_elimination(tid, &seeded_entries(tid, 1)),
        Err(TournamentError::NotEnoughEntries {
            required: 2,
            provided: 1
        })
    ));
}

#[test]
fn two_entries_drop_loser_straight_into_grand_final() {
    let tid = Uuid::new_v4();
    let graph = generate_double_elimination(tid, &seeded_entries(tid, 2)).unwrap();
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.rounds(BracketSide::Losers), 0);

    let final_id = graph.get(BracketSide::Finals, 1, 1).unwrap().id;
    let only = graph.get(BracketSide::Winners, 1, 1).unwrap();
    assert_eq!(only.winner_next.unwrap().match_id, final_id);
    assert_eq!(only.winner_next.unwrap().slot, Slot::One);
    assert_eq!(only.loser_next.unwrap().match_id, final_id);
    assert_eq!(only.loser_next.unwrap().slot, Slot::Two);
}

/// Every slot outside winners round one is fed by exactly one forward link.
fn assert_fully_fed(graph: &BracketGraph) {
    let mut feeds: HashMap<(Uuid, Slot), usize> = HashMap::new();
    for m in graph.iter() {
        for target in m.winner_next.into_iter().chain(m.loser_next) {
            let next = graph.by_id(target.match_id).expect("target exists");
            let later = match (m.side, next.side) {
                (a, b) if a == b => next.round > m.round,
                (BracketSide::Winners, BracketSide::Losers) => true,
                (_, BracketSide::Finals) => true,
                _ => false,
            };
            assert!(later, "link from {:?} r{} to {:?} r{}", m.side, m.round, next.side, next.round);
            *feeds.entry((target.match_id, target.slot)).or_insert(0) += 1;
        }
    }
    for m in graph.iter() {
        if m.side == BracketSide::Winners && m.round == 1 {
            continue;
        }
        for slot in [Slot::One, Slot::Two] {
            assert_eq!(feeds.get(&(m.id, slot)), Some(&1), "{:?} r{} #{} {:?}", m.side, m.round, m.order, slot);
        }
    }
}

#[test]
fn full_brackets_are_consistent_up_to_64() {
    for size in [2usize, 4, 8, 16, 32, 64] {
        let tid = Uuid::new_v4();
        let graph = generate_double_elimination(tid, &seeded_entries(tid, size)).unwrap();
        let rounds = size.trailing_zeros();

        assert_eq!(graph.len(), 2 * size - 2, "size {size}");
        assert_eq!(graph.rounds(BracketSide::Winners), rounds);
        assert_eq!(graph.rounds(BracketSide::Losers), 2 * (rounds - 1));
        assert!(graph.iter().all(|m| !m.is_bye));
        assert_eq!(graph.iter().filter(|m| m.winner_next.is_none()).count(), 1);
        assert!(graph
            .iter()
            .all(|m| m.loser_next.is_some() == (m.side == BracketSide::Winners)));
        assert_fully_fed(&graph);
    }
}

#[test]
fn later_winners_losers_drop_in_reverse_order() {
    let tid = Uuid::new_v4();
    let graph = generate_double_elimination(tid, &seeded_entries(tid, 8)).unwrap();

    let l2 = |order| graph.get(BracketSide::Losers, 2, order).unwrap().id;
    let w2_1 = graph.get(BracketSide::Winners, 2, 1).unwrap().loser_next.unwrap();
    let w2_2 = graph.get(BracketSide::Winners, 2, 2).unwrap().loser_next.unwrap();
    assert_eq!((w2_1.match_id, w2_1.slot), (l2(2), Slot::Two));
    assert_eq!((w2_2.match_id, w2_2.slot), (l2(1), Slot::Two));

    let w3 = graph.get(BracketSide::Winners, 3, 1).unwrap().loser_next.unwrap();
    let l4 = graph.get(BracketSide::Losers, 4, 1).unwrap();
    assert_eq!((w3.match_id, w3.slot), (l4.id, Slot::Two));

    let final_id = graph.get(BracketSide::Finals, 1, 1).unwrap().id;
    assert_eq!(l4.winner_next.unwrap().match_id, final_id);
    assert_eq!(l4.winner_next.unwrap().slot, Slot::Two);

    // Winners round one losers pair up in losers round one.
    let w1_3 = graph.get(BracketSide::Winners, 1, 3).unwrap().loser_next.unwrap();
    let w1_4 = graph.get(BracketSide::Winners, 1, 4).unwrap().loser_next.unwrap();
    let l1_2 = graph.get(BracketSide::Losers, 1, 2).unwrap().id;
    assert_eq!((w1_3.match_id, w1_3.slot), (l1_2, Slot::One));
    assert_eq!((w1_4.match_id, w1_4.slot), (l1_2, Slot::Two));
}

#[test]
fn four_entries_route_winner_and_loser() {
    let store = MemoryStore::new();
    let data = create(&store, 4);
    assert_eq!(data.matches.len(), 6);

    let w1_1 = find(&data, BracketSide::Winners, 1, 1);
    let seed_1 = data.entries[0].id;
    let seed_4 = data.entries[3].id;
    assert_eq!((w1_1.entry_1, w1_1.entry_2), (Some(seed_1), Some(seed_4)));

    advance_winner(&store, w1_1.id, seed_1).unwrap();
    let data = tournament_data(&store, data.tournament.id).unwrap();

    let w2_1 = find(&data, BracketSide::Winners, 2, 1);
    assert_eq!(w2_1.entry_1, Some(seed_1));
    let l1_1 = find(&data, BracketSide::Losers, 1, 1);
    assert_eq!(l1_1.slot_of(seed_4), Some(Slot::One));
}

#[test]
fn five_entries_propagate_byes_through_losers_bracket() {
    let store = MemoryStore::new();
    let data = create(&store, 5);
    let seed = |s: usize| data.entries[s - 1].id;

    // Winners round one: only seed 4 v seed 5 is contested.
    let byes: Vec<_> = data
        .matches
        .iter()
        .filter(|m| m.side == BracketSide::Winners && m.is_bye)
        .collect();
    assert_eq!(byes.len(), 3);
    assert!(byes.iter().all(|m| m.is_finished() && m.loser_next.is_none()));

    // Both feeders of losers 1-2 are byes: it can never be played.
    let l1_2 = find(&data, BracketSide::Losers, 1, 2);
    assert!(l1_2.is_bye);
    assert_eq!(l1_2.status, MatchStatus::Pending);
    assert_eq!((l1_2.entry_1, l1_2.entry_2), (None, None));

    // Losers 1-1 waits for the loser of seed 4 v seed 5 only.
    let l1_1 = find(&data, BracketSide::Losers, 1, 1);
    assert!(l1_1.is_bye);
    assert_eq!(l1_1.status, MatchStatus::Pending);

    // Losers 2-2 only ever receives a winners round two loser.
    assert!(find(&data, BracketSide::Losers, 2, 2).is_bye);
    assert!(!find(&data, BracketSide::Losers, 2, 1).is_bye);
    assert!(!find(&data, BracketSide::Losers, 3, 1).is_bye);

    let w1_2 = find(&data, BracketSide::Winners, 1, 2);
    assert_eq!((w1_2.entry_1, w1_2.entry_2), (Some(seed(4)), Some(seed(5))));
    advance_winner(&store, w1_2.id, seed(4)).unwrap();
    let data = tournament_data(&store, data.tournament.id).unwrap();

    // Seed 5 drops to losers 1-1, which resolves on its own into losers 2-1.
    let l1_1 = find(&data, BracketSide::Losers, 1, 1);
    assert_eq!(l1_1.status, MatchStatus::Finished);
    assert_eq!(l1_1.winner(), Some(seed(5)));
    let l2_1 = find(&data, BracketSide::Losers, 2, 1);
    assert_eq!(l2_1.entry_1, Some(seed(5)));
    assert_eq!(l2_1.entry_2, None);
    assert_eq!(l2_1.status, MatchStatus::Pending);

    let w2_1 = find(&data, BracketSide::Winners, 2, 1);
    assert_eq!((w2_1.entry_1, w2_1.entry_2), (Some(seed(1)), Some(seed(4))));
}

#[test]
fn bye_in_losers_round_two_advances_dropped_player() {
    let store = MemoryStore::new();
    let data = create(&store, 5);
    let seed = |s: usize| data.entries[s - 1].id;
    let tid = data.tournament.id;

    advance_winner(&store, find(&data, BracketSide::Winners, 1, 2).id, seed(4)).unwrap();
    advance_winner(&store, find(&data, BracketSide::Winners, 2, 1).id, seed(1)).unwrap();
    let data = tournament_data(&store, tid).unwrap();

    // Winners 2-1 loser drops (reversed) into losers 2-2, a bye, and passes to losers 3-1.
    let l2_2 = find(&data, BracketSide::Losers, 2, 2);
    assert_eq!(l2_2.status, MatchStatus::Finished);
    assert_eq!(l2_2.winner(), Some(seed(4)));
    let l3_1 = find(&data, BracketSide::Losers, 3, 1);
    assert_eq!(l3_1.entry_2, Some(seed(4)));
}
