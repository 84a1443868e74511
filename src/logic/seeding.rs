//! Seeding: bracket size and the round-one pairing order.

/// Smallest power of two that can hold `count` entries (5 -> 8, 8 -> 8, 9 -> 16). Zero for zero.
pub fn bracket_size(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    count.next_power_of_two()
}

/// Number of rounds in a winners bracket of `size` slots (`size` must be a power of two).
pub fn total_rounds(size: usize) -> u32 {
    if size < 2 {
        return 0;
    }
    size.trailing_zeros()
}

/// Round-one pairs of slot indices `0..size` so that the top seed meets the lowest seed and
/// the two halves of the bracket mirror each other.
///
/// Starting from `[0]`, each doubling to `k` slots replaces every index `s` with
/// `s, (k - 1) - s`; consecutive indices are then paired. For 8 slots this gives
/// `(0,7), (3,4), (1,6), (2,5)`.
pub fn round_one_pairs(size: usize) -> Vec<(usize, usize)> {
    if size == 0 {
        return Vec::new();
    }

    let mut order = vec![0usize];
    while order.len() < size {
        let count = order.len() * 2;
        order = order
            .iter()
            .flat_map(|&seed| [seed, (count - 1) - seed])
            .collect();
    }

    order.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}
