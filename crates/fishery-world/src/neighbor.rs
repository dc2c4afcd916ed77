//! Vacant-tile search around a position.

use crate::grid::TileGrid;
use fishery_core::Position;
use rand::seq::SliceRandom;
use rand::Rng;

/// Vegetation level a vacant tile needs to be preferred as a destination.
const PREFERRED_VEGETATION: i32 = 1;

/// Pick a destination for a pool at `position`.
///
/// Looks at the square of side `2 * radius + 1` around `position`, clipped to
/// the grid and excluding `position`. A uniformly random vacant tile with
/// vegetation above level 1 is returned if there is one, otherwise a
/// uniformly random vacant tile, otherwise `None`.
pub fn find_move<R: Rng + ?Sized>(
    grid: &TileGrid,
    position: Position,
    radius: i32,
    rng: &mut R,
) -> Option<Position> {
    if !grid.contains(position) {
        return None;
    }

    let mut vegetated = Vec::new();
    let mut vacant = Vec::new();
    for candidate in grid.square(position, radius) {
        if candidate == position {
            continue;
        }
        let tile = grid.tile(candidate);
        if !tile.is_vacant() {
            continue;
        }
        if tile.vegetation_level > PREFERRED_VEGETATION {
            vegetated.push(candidate);
        } else {
            vacant.push(candidate);
        }
    }

    if vegetated.is_empty() {
        vacant.choose(rng).copied()
    } else {
        vegetated.choose(rng).copied()
    }
}
