use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::session::SLOT_COUNT;

/// Picks where the next avocado pops up and which letter it carries
#[derive(Debug)]
pub struct Spawner {
    rng: StdRng,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random free slot and random letter, or `None` when every slot is
    /// taken. Slots are 1-based.
    pub fn pick(&mut self, occupied: &[u8]) -> Option<(u8, char)> {
        let free: Vec<u8> = (1..=SLOT_COUNT).filter(|s| !occupied.contains(s)).collect();
        let slot = *free.choose(&mut self.rng)?;
        Some((slot, self.letter()))
    }

    pub fn letter(&mut self) -> char {
        (b'A' + self.rng.gen_range(0..26u8)) as char
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_are_in_range() {
        let mut spawner = Spawner::seeded(7);
        for _ in 0..500 {
            let (slot, label) = spawner.pick(&[]).unwrap();
            assert!((1..=SLOT_COUNT).contains(&slot));
            assert!(label.is_ascii_uppercase());
        }
    }

    #[test]
    fn never_picks_an_occupied_slot() {
        let mut spawner = Spawner::seeded(11);
        let occupied = [1, 2, 3, 5, 6, 7];
        for _ in 0..100 {
            assert_eq!(spawner.pick(&occupied).map(|(s, _)| s), Some(4));
        }
    }

    #[test]
    fn full_board_yields_nothing() {
        let mut spawner = Spawner::seeded(3);
        assert_eq!(spawner.pick(&[1, 2, 3, 4, 5, 6, 7]), None);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Spawner::seeded(99);
        let mut b = Spawner::seeded(99);
        for _ in 0..20 {
            assert_eq!(a.pick(&[]), b.pick(&[]));
        }
    }
}
