//! Dense 2D grid of vegetation tiles.

use crate::pool::PoolId;
use fishery_core::{GridShape, Position, Settings};
use rand::seq::index;
use rand::Rng;

/// One grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    pub vegetation_level: i32,
    pub soil_energy: i32,
    /// Back-reference to the pool living here. Only the ecosystem writes it.
    pub(crate) occupant: Option<PoolId>,
}

impl Tile {
    pub fn with_soil(soil_energy: i32) -> Self {
        Self {
            soil_energy,
            ..Default::default()
        }
    }

    pub fn occupant(&self) -> Option<PoolId> {
        self.occupant
    }

    pub fn is_vacant(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Fixed-size grid, bounded (not wrapping), stored column-major.
#[derive(Debug, Clone)]
pub struct TileGrid {
    shape: GridShape,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(shape: GridShape, soil_energy: i32) -> Self {
        Self {
            shape,
            tiles: vec![Tile::with_soil(soil_energy); shape.area()],
        }
    }

    /// Create a grid from settings, seeding `initial_vegetation_size`
    /// distinct tiles with level-1 vegetation.
    pub fn from_settings<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Self {
        let soil = settings.soil_energy_increase_turn.min(settings.soil_energy_max);
        let mut grid = Self::new(settings.shape(), soil);

        let seeds = settings.initial_vegetation_size.max(0) as usize;
        for i in index::sample(rng, grid.tiles.len(), seeds.min(grid.tiles.len())) {
            grid.tiles[i].vegetation_level = 1;
        }

        grid
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn width(&self) -> i32 {
        self.shape.width
    }

    pub fn height(&self) -> i32 {
        self.shape.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.shape.contains(pos)
    }

    /// Tile at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        if self.contains(pos) {
            Some(&self.tiles[self.shape.internal_index(pos)])
        } else {
            None
        }
    }

    /// Tile at an in-bounds position.
    pub fn tile(&self, pos: Position) -> &Tile {
        &self.tiles[self.shape.internal_index(pos)]
    }

    pub fn tile_mut(&mut self, pos: Position) -> &mut Tile {
        let index = self.shape.internal_index(pos);
        &mut self.tiles[index]
    }

    /// All tiles in storage order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Iterator over all tiles with positions, in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (self.shape.internal_position(i), tile))
    }

    /// Positions of the square of side `2 * radius + 1` around `center`,
    /// clipped to the grid. Includes `center` itself.
    pub fn square(&self, center: Position, radius: i32) -> impl Iterator<Item = Position> {
        let radius = radius.max(0);
        let x_min = (center.x - radius).max(0);
        let x_max = (center.x + radius).min(self.shape.width - 1);
        let y_min = (center.y - radius).max(0);
        let y_max = (center.y + radius).min(self.shape.height - 1);

        (x_min..=x_max).flat_map(move |x| (y_min..=y_max).map(move |y| Position::new(x, y)))
    }

    /// Every tile without a pool, in storage order.
    pub fn vacant_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, tile)| tile.is_vacant())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn total_vegetation(&self) -> i64 {
        self.tiles.iter().map(|t| t.vegetation_level as i64).sum()
    }

    /// Vegetation levels in row-major order (x varying fastest).
    pub fn vegetation_levels(&self) -> Vec<i32> {
        let mut levels = vec![0; self.tiles.len()];
        for (i, tile) in self.tiles.iter().enumerate() {
            levels[self.shape.internal_to_external(i)] = tile.vegetation_level;
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = TileGrid::new(GridShape::new(10, 8), 3);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.tiles().len(), 80);
        assert!(grid.tiles().iter().all(|t| t.soil_energy == 3 && t.is_vacant()));
    }

    #[test]
    fn test_grid_from_settings() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let settings = Settings {
            initial_vegetation_size: 37,
            ..Default::default()
        };

        let grid = TileGrid::from_settings(&settings, &mut rng);
        let seeded = grid.tiles().iter().filter(|t| t.vegetation_level == 1).count();
        assert_eq!(seeded, 37);
        assert!(grid.tiles().iter().all(|t| t.vegetation_level <= 1));
        assert!(grid
            .tiles()
            .iter()
            .all(|t| t.soil_energy == settings.soil_energy_increase_turn));
    }

    #[test]
    fn test_bounds_are_not_wrapped() {
        let grid = TileGrid::new(GridShape::new(5, 5), 0);
        assert!(grid.get(Position::new(-1, 0)).is_none());
        assert!(grid.get(Position::new(0, 5)).is_none());
        assert!(grid.get(Position::new(4, 4)).is_some());
    }

    #[test]
    fn test_square_is_clipped() {
        let grid = TileGrid::new(GridShape::new(10, 10), 0);

        assert_eq!(grid.square(Position::new(5, 5), 1).count(), 9);
        assert_eq!(grid.square(Position::new(0, 0), 1).count(), 4);
        assert_eq!(grid.square(Position::new(9, 5), 1).count(), 6);
        assert_eq!(grid.square(Position::new(5, 5), 2).count(), 25);
        assert_eq!(grid.square(Position::new(5, 5), 0).count(), 1);
    }

    #[test]
    fn test_vegetation_levels_are_row_major() {
        let mut grid = TileGrid::new(GridShape::new(3, 2), 0);
        grid.tile_mut(Position::new(2, 0)).vegetation_level = 4;
        grid.tile_mut(Position::new(0, 1)).vegetation_level = 7;

        assert_eq!(grid.vegetation_levels(), vec![0, 0, 4, 7, 0, 0]);
        assert_eq!(grid.total_vegetation(), 11);
    }
}
