//! Per-step fish population rule: foraging, growth, splitting, starvation
//! and random spawning.

use crate::ecosystem::Ecosystem;
use crate::neighbor::find_move;
use crate::pool::PoolId;
use fishery_core::{Result, Settings};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

/// Search radius for both movement and splitting.
const MOVE_RADIUS: i32 = 1;

/// What happened to the population during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationChange {
    pub moves: u32,
    /// Vegetation levels eaten
    pub eaten: i64,
    pub level_ups: u32,
    pub splits: u32,
    /// Levels lost to hunger
    pub starved: u32,
    /// Pools that starved to death
    pub deaths: u32,
    pub spawned: u32,
}

/// Advance every pool by one step, then maybe spawn a random pool.
///
/// Only pools registered when the step starts are processed. Pools created by
/// splitting or spawning during the step take part from the next step on.
pub fn update_fish_population<R: Rng + ?Sized>(
    eco: &mut Ecosystem,
    settings: &Settings,
    rng: &mut R,
) -> Result<PopulationChange> {
    let mut change = PopulationChange::default();
    let snapshot: Vec<PoolId> = eco.pools().handles().collect();

    for id in snapshot {
        if !eco.pools().contains(id) {
            continue;
        }
        forage(eco, settings, rng, id, &mut change)?;
        settle(eco, settings, rng, id, &mut change)?;
    }

    spawn_random(eco, settings, rng, &mut change)?;

    Ok(change)
}

/// Eat from the current tile, moving to a neighbour whenever it is bare,
/// until the pool is full or runs out of moves.
fn forage<R: Rng + ?Sized>(
    eco: &mut Ecosystem,
    settings: &Settings,
    rng: &mut R,
    id: PoolId,
    change: &mut PopulationChange,
) -> Result<()> {
    for _ in 0..settings.fish_moves_turn {
        let pool = eco.pool(id)?;
        let appetite = settings.fish_appetite_at(pool.pop_level);
        let food_level = pool.food_level;
        let mut position = pool.position();

        if food_level >= appetite {
            break;
        }

        if eco.grid().tile(position).vegetation_level == 0 {
            let Some(to) = find_move(eco.grid(), position, MOVE_RADIUS, rng) else {
                break;
            };
            eco.move_pool(id, to)?;
            position = to;
            change.moves += 1;
        }

        let tile = eco.grid.tile_mut(position);
        if tile.vegetation_level > 0 {
            let consumed = (appetite - food_level).min(tile.vegetation_level);
            tile.vegetation_level -= consumed;
            eco.pool_mut(id)?.food_level += consumed;
            change.eaten += consumed as i64;
        }
    }

    Ok(())
}

/// Grow, split or starve depending on the food gathered.
fn settle<R: Rng + ?Sized>(
    eco: &mut Ecosystem,
    settings: &Settings,
    rng: &mut R,
    id: PoolId,
    change: &mut PopulationChange,
) -> Result<()> {
    let growth_req = settings.fish_growth_req;
    let pool = eco.pool(id)?;
    let position = pool.position();
    let upkeep = settings.fish_consumption_at(pool.pop_level);

    if pool.food_level < growth_req + upkeep {
        let pool = eco.pool_mut(id)?;
        pool.food_level -= upkeep;
        if pool.food_level < 0 {
            pool.pop_level -= 1;
            pool.food_level = 0;
            change.starved += 1;
            if pool.pop_level <= 0 {
                eco.remove_pool(id);
                change.deaths += 1;
                trace!(pool = ?id, %position, "Pool starved");
            }
        }
        return Ok(());
    }

    if pool.pop_level < settings.fish_level_max {
        let pool = eco.pool_mut(id)?;
        while pool.food_level >= growth_req + settings.fish_consumption_at(pool.pop_level)
            && pool.pop_level < settings.fish_level_max
        {
            pool.pop_level += 1;
            pool.food_level -= growth_req + settings.fish_consumption_at(pool.pop_level);
            change.level_ups += 1;
        }
        return Ok(());
    }

    match find_move(eco.grid(), position, MOVE_RADIUS, rng) {
        Some(to) if settings.splits_enabled() => {
            eco.pool_mut(id)?.food_level -= growth_req + upkeep;
            let child = eco.spawn_pool(to)?;
            change.splits += 1;
            trace!(parent = ?id, child = ?child, from = %position, %to, "Pool split");
        }
        _ => eco.pool_mut(id)?.food_level -= upkeep,
    }

    Ok(())
}

fn spawn_random<R: Rng + ?Sized>(
    eco: &mut Ecosystem,
    settings: &Settings,
    rng: &mut R,
    change: &mut PopulationChange,
) -> Result<()> {
    if settings.random_fishes_interval <= 0 || !rng.gen_bool(settings.spawn_probability()) {
        return Ok(());
    }

    let vacant = eco.grid().vacant_positions();
    if let Some(&pos) = vacant.choose(rng) {
        let id = eco.spawn_pool(pos)?;
        change.spawned += 1;
        trace!(pool = ?id, position = %pos, "Random pool spawned");
    }

    Ok(())
}
