//! Fishery ecosystem simulation engine.
//!
//! A bounded 2D grid of tiles carries vegetation fed by soil energy. Fish
//! pools forage across the grid, grow, split, starve and are harvested.

pub mod grid;
pub mod vegetation;
pub mod pool;
pub mod ecosystem;
pub mod neighbor;
pub mod population;
pub mod fishing;
pub mod simulation;
pub mod manager;

pub use grid::{Tile, TileGrid};
pub use pool::{FishPool, FishPoolRegistry, PoolId};
pub use ecosystem::Ecosystem;
pub use neighbor::find_move;
pub use simulation::{FishPopulation, PoolEntry, SimulationState, StepReport};
pub use manager::{DestroyTarget, SimulationManager};
