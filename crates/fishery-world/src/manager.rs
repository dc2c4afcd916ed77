//! Table of live simulations and the seed source they draw from.

use crate::simulation::{FishPopulation, SimulationState};
use chrono::Utc;
use fishery_core::{Error, Result, Results, Settings, SimulationId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Which simulations a destroy call applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyTarget {
    All,
    One(SimulationId),
}

impl From<SimulationId> for DestroyTarget {
    fn from(id: SimulationId) -> Self {
        DestroyTarget::One(id)
    }
}

/// Owns every simulation created through it, addressed by id.
///
/// Each new simulation gets its own seed drawn from the manager's source, so
/// simulations never share a random stream.
#[derive(Debug)]
pub struct SimulationManager {
    simulations: BTreeMap<SimulationId, SimulationState>,
    next_id: u32,
    seed_source: ChaCha8Rng,
}

impl Default for SimulationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationManager {
    /// A manager seeded from the wall clock.
    pub fn new() -> Self {
        Self::with_seed(clock_seed())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            simulations: BTreeMap::new(),
            next_id: 1,
            seed_source: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Reseed the source used for simulations created from now on. `None`
    /// seeds from the current time.
    pub fn set_rng_seed(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(clock_seed);
        self.seed_source = ChaCha8Rng::seed_from_u64(seed);
        debug!(seed, "Seed source reset");
    }

    /// Validate `settings` and create a simulation. A rejected call allocates
    /// nothing, consumes no id and draws no seed.
    #[instrument(skip(self, settings))]
    pub fn create_simulation(&mut self, settings: Settings) -> Result<SimulationId> {
        settings.validate()?;

        let id = SimulationId(self.next_id);
        let seed = self.seed_source.gen::<u64>();
        let simulation = SimulationState::new(id, settings, seed)?;

        self.next_id += 1;
        self.simulations.insert(id, simulation);
        Ok(id)
    }

    pub fn get_vegetation_snapshot(&self, id: SimulationId) -> Result<Vec<i32>> {
        Ok(self.simulation(id)?.vegetation_snapshot())
    }

    pub fn get_fish_population(&self, id: SimulationId) -> Result<FishPopulation> {
        Ok(self.simulation(id)?.fish_population())
    }

    pub fn advance_simulation(&mut self, id: SimulationId, steps: i64) -> Result<Results> {
        self.simulation_mut(id)?.advance(steps)
    }

    /// Destroy one simulation, or all of them. Returns how many were removed.
    pub fn destroy_simulation(&mut self, target: impl Into<DestroyTarget>) -> Result<usize> {
        match target.into() {
            DestroyTarget::All => {
                let count = self.simulations.len();
                self.simulations.clear();
                info!(count, "All simulations destroyed");
                Ok(count)
            }
            DestroyTarget::One(id) => {
                self.simulations
                    .remove(&id)
                    .ok_or(Error::SimulationNotFound(id))?;
                info!(simulation = %id, "Simulation destroyed");
                Ok(1)
            }
        }
    }

    pub fn does_simulation_exist(&self, id: SimulationId) -> bool {
        self.simulations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    pub fn simulation(&self, id: SimulationId) -> Result<&SimulationState> {
        self.simulations.get(&id).ok_or(Error::SimulationNotFound(id))
    }

    fn simulation_mut(&mut self, id: SimulationId) -> Result<&mut SimulationState> {
        self.simulations.get_mut(&id).ok_or(Error::SimulationNotFound(id))
    }
}

fn clock_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros()) as u64
}
