//! Per-step harvest of fish pools.

use crate::ecosystem::Ecosystem;
use crate::pool::PoolId;
use rand::Rng;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FishingOutcome {
    /// Levels caught this step
    pub yield_: i64,
    /// Pools fished out entirely
    pub removed: u32,
}

/// Give every pool an independent `chance` of losing one level. A pool that
/// reaches level 0 is removed.
pub fn fishing_event<R: Rng + ?Sized>(eco: &mut Ecosystem, chance: f64, rng: &mut R) -> FishingOutcome {
    let mut outcome = FishingOutcome::default();
    let chance = chance.clamp(0.0, 1.0);
    let snapshot: Vec<PoolId> = eco.pools().handles().collect();

    for id in snapshot {
        if !rng.gen_bool(chance) {
            continue;
        }
        let Some(pool) = eco.pools.get_mut(id) else {
            continue;
        };
        pool.pop_level -= 1;
        outcome.yield_ += 1;
        if !pool.is_alive() {
            eco.remove_pool(id);
            outcome.removed += 1;
            trace!(pool = ?id, "Pool fished out");
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use fishery_core::{GridShape, Position};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn eco_with_levels(levels: &[i32]) -> Ecosystem {
        let mut eco = Ecosystem::new(TileGrid::new(GridShape::new(5, 5), 0));
        for (x, &level) in levels.iter().enumerate() {
            let id = eco.spawn_pool(Position::new(x as i32, 0)).unwrap();
            eco.pool_mut(id).unwrap().pop_level = level;
        }
        eco
    }

    #[test]
    fn test_certain_catch_takes_one_level() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut eco = eco_with_levels(&[3]);

        let outcome = fishing_event(&mut eco, 1.0, &mut rng);

        let (_, pool) = eco.pools().iter().next().unwrap();
        assert_eq!(pool.pop_level, 2);
        assert_eq!(outcome, FishingOutcome { yield_: 1, removed: 0 });
    }

    #[test]
    fn test_zero_chance_catches_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut eco = eco_with_levels(&[1, 2, 3]);

        let outcome = fishing_event(&mut eco, 0.0, &mut rng);

        assert_eq!(outcome, FishingOutcome::default());
        assert_eq!(eco.total_population(), 6);
    }

    #[test]
    fn test_fished_out_pools_are_removed() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut eco = eco_with_levels(&[1, 2, 1, 4]);

        let outcome = fishing_event(&mut eco, 1.0, &mut rng);

        assert_eq!(outcome.yield_, 4);
        assert_eq!(outcome.removed, 2);
        assert_eq!(eco.pools().len(), 2);
        assert_eq!(eco.total_population(), 4);
        assert!(!eco.is_occupied(Position::new(0, 0)));
        eco.verify_occupancy().unwrap();
    }

    #[test]
    fn test_yield_matches_population_loss() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut eco = eco_with_levels(&[5, 5, 5, 5, 5]);

        let mut caught = 0;
        for _ in 0..4 {
            let before = eco.total_population();
            let outcome = fishing_event(&mut eco, 0.5, &mut rng);
            assert_eq!(before - eco.total_population(), outcome.yield_);
            caught += outcome.yield_;
        }

        assert!(caught > 0);
        eco.verify_occupancy().unwrap();
    }
}
