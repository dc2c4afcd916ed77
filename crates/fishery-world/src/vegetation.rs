//! Per-step vegetation and soil rule.
//!
//! Every decision is taken against the levels the grid had when the step
//! started: changes are collected as per-tile deltas and only applied once all
//! tiles have been examined.

use crate::grid::TileGrid;
use fishery_core::Settings;

/// Counts of the deltas applied in one vegetation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VegetationChange {
    /// Vegetated tiles that gained a level
    pub grown: u32,
    /// Vegetated tiles that lost a level to soil exhaustion
    pub decayed: u32,
    /// Empty tiles seeded by a spreading neighbour
    pub seeded: u32,
}

/// Advance vegetation and soil energy by one step.
pub fn update_vegetation(grid: &mut TileGrid, settings: &Settings) -> VegetationChange {
    let shape = grid.shape();
    let mut delta = vec![0i32; shape.area()];

    for index in 0..delta.len() {
        let level = grid.tiles()[index].vegetation_level;

        if level > 0 {
            let tile = &mut grid.tiles_mut()[index];
            let growth_cost = level + settings.vegetation_level_growth_req;
            if growth_cost <= tile.soil_energy {
                delta[index] = 1;
                tile.soil_energy -= growth_cost;
            } else {
                tile.soil_energy -= settings.vegetation_consumption_at(level);
                if tile.soil_energy < 0 {
                    delta[index] = -1;
                }
            }
        }

        if level >= settings.vegetation_level_spread_at {
            let center = shape.internal_position(index);
            for pos in grid.square(center, 1) {
                let target = shape.internal_index(pos);
                // Only empty tiles are seeded, and an empty tile never decays,
                // so this cannot cancel a decay.
                if grid.tiles()[target].vegetation_level == 0 {
                    delta[target] = 1;
                }
            }
        }
    }

    let mut change = VegetationChange::default();
    for (tile, &d) in grid.tiles_mut().iter_mut().zip(&delta) {
        match (d, tile.vegetation_level) {
            (1, 0) => change.seeded += 1,
            (1, _) => change.grown += 1,
            (-1, _) => change.decayed += 1,
            _ => {}
        }
        // A decay only ever applies to a level of at least one.
        tile.vegetation_level = (tile.vegetation_level + d).clamp(0, settings.vegetation_level_max);
        tile.soil_energy =
            (tile.soil_energy + settings.soil_energy_increase_turn).clamp(0, settings.soil_energy_max);
    }

    change
}
