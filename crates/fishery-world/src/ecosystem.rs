//! The tile grid and the pool registry, kept consistent with each other.
//!
//! Every pool in the registry is the occupant of the tile at its position,
//! and every occupied tile points at a live pool standing on it. All
//! operations that create, move or destroy pools go through this type so the
//! two views never disagree.

use crate::grid::TileGrid;
use crate::pool::{FishPool, FishPoolRegistry, PoolId};
use fishery_core::{Error, Position, Result, Settings};
use rand::seq::index;
use rand::Rng;
use tracing::trace;

/// Grid and pools behind one mutable surface.
///
/// Outside this crate pools can only be created, moved and removed; their
/// levels and the tiles they eat from change only through the update rules.
///
/// ```compile_fail
/// use fishery_core::{GridShape, Position};
/// use fishery_world::{Ecosystem, TileGrid};
///
/// let mut eco = Ecosystem::new(TileGrid::new(GridShape::new(3, 3), 0));
/// let id = eco.spawn_pool(Position::new(1, 1)).unwrap();
/// eco.pool_mut(id).unwrap().pop_level = 0;
/// ```
///
/// ```compile_fail
/// use fishery_core::{GridShape, Position};
/// use fishery_world::{Ecosystem, TileGrid};
///
/// let mut eco = Ecosystem::new(TileGrid::new(GridShape::new(3, 3), 0));
/// eco.grid_mut().tile_mut(Position::new(0, 0)).vegetation_level = 1_000;
/// ```
#[derive(Debug, Clone)]
pub struct Ecosystem {
    pub(crate) grid: TileGrid,
    pub(crate) pools: FishPoolRegistry,
}

impl Ecosystem {
    /// An ecosystem with no pools.
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            pools: FishPoolRegistry::new(),
        }
    }

    /// Seed vegetation and place `initial_fish_size` level-1 pools on
    /// distinct random tiles.
    pub fn from_settings<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Result<Self> {
        let grid = TileGrid::from_settings(settings, rng);
        let shape = grid.shape();
        let area = shape.area();
        let fish = (settings.initial_fish_size.max(0) as usize).min(area);

        let mut eco = Self {
            grid,
            pools: FishPoolRegistry::with_capacity(fish),
        };
        for i in index::sample(rng, area, fish) {
            eco.spawn_pool(shape.internal_position(i))?;
        }

        Ok(eco)
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable access to tile vegetation and soil. Occupancy stays read-only.
    pub(crate) fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn pools(&self) -> &FishPoolRegistry {
        &self.pools
    }

    pub fn pool(&self, id: PoolId) -> Result<&FishPool> {
        self.pools
            .get(id)
            .ok_or_else(|| Error::InvalidState(format!("pool {id:?} is not registered")))
    }

    pub(crate) fn pool_mut(&mut self, id: PoolId) -> Result<&mut FishPool> {
        self.pools
            .get_mut(id)
            .ok_or_else(|| Error::InvalidState(format!("pool {id:?} is not registered")))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.grid.get(pos).is_some_and(|tile| !tile.is_vacant())
    }

    pub fn total_population(&self) -> i64 {
        self.pools.total_population()
    }

    pub fn total_vegetation(&self) -> i64 {
        self.grid.total_vegetation()
    }

    /// Create a level-1 pool on a vacant tile.
    pub fn spawn_pool(&mut self, pos: Position) -> Result<PoolId> {
        self.check_vacant(pos)?;
        let id = self.pools.insert(FishPool::new(pos));
        self.grid.tile_mut(pos).occupant = Some(id);
        Ok(id)
    }

    /// Move a pool onto a vacant tile.
    pub fn move_pool(&mut self, id: PoolId, to: Position) -> Result<()> {
        self.check_vacant(to)?;
        let pool = self
            .pools
            .get_mut(id)
            .ok_or_else(|| Error::InvalidState(format!("pool {id:?} is not registered")))?;
        let from = pool.position();
        pool.set_position(to);
        self.grid.tile_mut(from).occupant = None;
        self.grid.tile_mut(to).occupant = Some(id);
        trace!(pool = ?id, %from, %to, "Pool moved");
        Ok(())
    }

    /// Remove a pool and clear its tile.
    pub fn remove_pool(&mut self, id: PoolId) -> Option<FishPool> {
        let pool = self.pools.remove(id)?;
        let tile = self.grid.tile_mut(pool.position());
        if tile.occupant == Some(id) {
            tile.occupant = None;
        }
        trace!(pool = ?id, position = %pool.position(), "Pool removed");
        Some(pool)
    }

    /// Check the occupancy invariant in both directions.
    pub fn verify_occupancy(&self) -> Result<()> {
        for (id, pool) in self.pools.iter() {
            let pos = pool.position();
            let occupant = self.grid.get(pos).and_then(|t| t.occupant);
            if occupant != Some(id) {
                return Err(Error::InvalidState(format!(
                    "pool {id:?} at {pos} but tile holds {occupant:?}"
                )));
            }
            if !pool.is_alive() {
                return Err(Error::InvalidState(format!(
                    "pool {id:?} at {pos} has pop level {}",
                    pool.pop_level
                )));
            }
        }

        let occupied = self.grid.tiles().iter().filter(|t| !t.is_vacant()).count();
        if occupied != self.pools.len() {
            return Err(Error::InvalidState(format!(
                "{occupied} occupied tiles for {} pools",
                self.pools.len()
            )));
        }

        Ok(())
    }

    fn check_vacant(&self, pos: Position) -> Result<()> {
        match self.grid.get(pos) {
            None => Err(Error::InvalidState(format!("position {pos} is outside the grid"))),
            Some(tile) if !tile.is_vacant() => {
                Err(Error::InvalidState(format!("position {pos} is already occupied")))
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishery_core::GridShape;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn empty(width: i32, height: i32) -> Ecosystem {
        Ecosystem::new(TileGrid::new(GridShape::new(width, height), 0))
    }

    #[test]
    fn test_from_settings_places_distinct_pools() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let settings = Settings {
            initial_fish_size: 60,
            ..Default::default()
        };

        let eco = Ecosystem::from_settings(&settings, &mut rng).unwrap();

        assert_eq!(eco.pools().len(), 60);
        assert!(eco.pools().iter().all(|(_, p)| p.pop_level == 1 && p.food_level == 0));
        eco.verify_occupancy().unwrap();
    }

    #[test]
    fn test_fill_entire_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let settings = Settings {
            initial_fish_size: 100,
            initial_vegetation_size: 100,
            ..Default::default()
        };

        let eco = Ecosystem::from_settings(&settings, &mut rng).unwrap();

        assert!(eco.grid().vacant_positions().is_empty());
        assert_eq!(eco.total_vegetation(), 100);
    }

    #[test]
    fn test_spawn_rejects_occupied_tile() {
        let mut eco = empty(3, 3);
        eco.spawn_pool(Position::new(1, 1)).unwrap();

        assert!(matches!(eco.spawn_pool(Position::new(1, 1)), Err(Error::InvalidState(_))));
        assert!(matches!(eco.spawn_pool(Position::new(3, 0)), Err(Error::InvalidState(_))));
        assert_eq!(eco.pools().len(), 1);
    }

    #[test]
    fn test_move_updates_both_tiles() {
        let mut eco = empty(3, 3);
        let id = eco.spawn_pool(Position::new(0, 0)).unwrap();

        eco.move_pool(id, Position::new(1, 0)).unwrap();

        assert!(!eco.is_occupied(Position::new(0, 0)));
        assert_eq!(eco.grid().tile(Position::new(1, 0)).occupant(), Some(id));
        assert_eq!(eco.pool(id).unwrap().position(), Position::new(1, 0));
        eco.verify_occupancy().unwrap();
    }

    #[test]
    fn test_move_onto_occupied_tile_fails() {
        let mut eco = empty(3, 3);
        let a = eco.spawn_pool(Position::new(0, 0)).unwrap();
        eco.spawn_pool(Position::new(1, 0)).unwrap();

        assert!(eco.move_pool(a, Position::new(1, 0)).is_err());
        eco.verify_occupancy().unwrap();
    }

    #[test]
    fn test_remove_clears_tile() {
        let mut eco = empty(3, 3);
        let id = eco.spawn_pool(Position::new(2, 2)).unwrap();

        let removed = eco.remove_pool(id).unwrap();

        assert_eq!(removed.position(), Position::new(2, 2));
        assert!(!eco.is_occupied(Position::new(2, 2)));
        assert!(eco.pools().is_empty());
        assert!(eco.remove_pool(id).is_none());
        eco.verify_occupancy().unwrap();
    }

    #[test]
    fn test_verify_detects_dangling_occupant() {
        let mut eco = empty(3, 3);
        let id = eco.spawn_pool(Position::new(0, 0)).unwrap();
        eco.pools.remove(id);

        assert!(eco.verify_occupancy().is_err());
    }

    #[test]
    fn test_verify_detects_dead_pool() {
        let mut eco = empty(3, 3);
        let id = eco.spawn_pool(Position::new(0, 0)).unwrap();
        eco.pool_mut(id).unwrap().pop_level = 0;

        assert!(eco.verify_occupancy().is_err());
    }
}
