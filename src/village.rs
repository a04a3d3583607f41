//! Native villages attached to `natives` cells.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::coords::Coord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    pub name: String,
    pub population: u32,
    pub aggressiveness: u32,
    pub available_workers: u32,
}

/// Source of villages for cells that roll the `natives` resource.
pub trait VillageFounder {
    fn found(&mut self, at: Coord, rng: &mut dyn RngCore) -> Village;
}

const SYLLABLES: &[&str] = &[
    "ka", "mo", "ba", "ngu", "li", "za", "te", "ru", "wa", "si", "do", "me", "ke", "lu",
];

/// Villages with random names, populations and temperaments.
#[derive(Debug, Clone, Copy)]
pub struct RandomVillages {
    pub max_population: u32,
    pub max_aggressiveness: u32,
}

impl RandomVillages {
    pub fn new() -> Self {
        Self {
            max_population: 9,
            max_aggressiveness: 10,
        }
    }
}

impl Default for RandomVillages {
    fn default() -> Self {
        Self::new()
    }
}

impl VillageFounder for RandomVillages {
    fn found(&mut self, _at: Coord, rng: &mut dyn RngCore) -> Village {
        let syllables = rng.gen_range(2..=3);
        let mut name = String::new();
        for _ in 0..syllables {
            name.push_str(SYLLABLES[rng.gen_range(0..SYLLABLES.len())]);
        }
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        let population = rng.gen_range(1..=self.max_population.max(1));
        Village {
            name,
            population,
            aggressiveness: rng.gen_range(1..=self.max_aggressiveness.max(1)),
            available_workers: rng.gen_range(0..=population / 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_villages_stay_in_range() {
        let mut founder = RandomVillages::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let village = founder.found(Coord::new(1, 1), &mut rng);
            assert!((1..=9).contains(&village.population));
            assert!((1..=10).contains(&village.aggressiveness));
            assert!(village.available_workers <= village.population / 2);
            assert!(village.name.chars().next().unwrap().is_ascii_uppercase());
        }
    }
}
