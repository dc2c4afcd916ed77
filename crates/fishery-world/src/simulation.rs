//! Simulation state and the stepping loop.

use crate::ecosystem::Ecosystem;
use crate::fishing::{fishing_event, FishingOutcome};
use crate::population::update_fish_population;
use crate::vegetation::update_vegetation;
use fishery_core::{
    Error, Result, Results, RunStatistics, Settings, SimulationId, MAX_STEPS_PER_CALL,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// What one step did, reported after every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Total pop level before fishing
    pub population: i64,
    /// Total vegetation at the end of the step
    pub vegetation: i64,
    pub yield_: i64,
    pub grown: u32,
    pub decayed: u32,
    pub seeded: u32,
    /// Vegetation levels eaten by fish
    pub eaten: i64,
    pub moves: u32,
    pub level_ups: u32,
    pub splits: u32,
    pub starved: u32,
    pub deaths: u32,
    pub fished_out: u32,
    pub spawned: u32,
}

/// One live pool as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Row-major tile index
    pub index: usize,
    pub pop_level: i32,
}

/// Snapshot of the live pools. An empty population is reported explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FishPopulation {
    Empty,
    Pools(Vec<PoolEntry>),
}

impl FishPopulation {
    pub fn is_empty(&self) -> bool {
        matches!(self, FishPopulation::Empty)
    }

    pub fn entries(&self) -> &[PoolEntry] {
        match self {
            FishPopulation::Empty => &[],
            FishPopulation::Pools(entries) => entries,
        }
    }
}

/// A single simulation: settings, world and its own random source.
#[derive(Debug, Clone)]
pub struct SimulationState {
    id: SimulationId,
    settings: Settings,
    ecosystem: Ecosystem,
    rng: ChaCha8Rng,
    steps_run: u64,
}

impl SimulationState {
    /// Validate `settings` and build a freshly seeded world.
    pub fn new(id: SimulationId, settings: Settings, seed: u64) -> Result<Self> {
        settings.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ecosystem = Ecosystem::from_settings(&settings, &mut rng)?;

        info!(
            simulation = %id,
            seed,
            width = settings.size_x,
            height = settings.size_y,
            pools = ecosystem.pools().len(),
            vegetation = ecosystem.total_vegetation(),
            "Simulation created"
        );

        Ok(Self {
            id,
            settings,
            ecosystem,
            rng,
            steps_run: 0,
        })
    }

    /// Wrap an existing world. The settings are trusted as given.
    pub fn from_parts(id: SimulationId, settings: Settings, ecosystem: Ecosystem, seed: u64) -> Self {
        Self {
            id,
            settings,
            ecosystem,
            rng: ChaCha8Rng::seed_from_u64(seed),
            steps_run: 0,
        }
    }

    pub fn id(&self) -> SimulationId {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    /// Steps run since creation, across all advance calls.
    pub fn steps_run(&self) -> u64 {
        self.steps_run
    }

    /// Run one step: vegetation, fish, then fishing.
    pub fn step(&mut self) -> Result<StepReport> {
        let vegetation = update_vegetation(&mut self.ecosystem.grid, &self.settings);
        let fish = update_fish_population(&mut self.ecosystem, &self.settings, &mut self.rng)?;
        let population = self.ecosystem.total_population();

        let fishing = if self.settings.fishing_chance > 0.0 {
            fishing_event(&mut self.ecosystem, self.settings.fishing_chance, &mut self.rng)
        } else {
            FishingOutcome::default()
        };

        self.steps_run += 1;

        #[cfg(debug_assertions)]
        self.ecosystem.verify_occupancy()?;

        let report = StepReport {
            population,
            vegetation: self.ecosystem.total_vegetation(),
            yield_: fishing.yield_,
            grown: vegetation.grown,
            decayed: vegetation.decayed,
            seeded: vegetation.seeded,
            eaten: fish.eaten,
            moves: fish.moves,
            level_ups: fish.level_ups,
            splits: fish.splits,
            starved: fish.starved,
            deaths: fish.deaths,
            fished_out: fishing.removed,
            spawned: fish.spawned,
        };

        debug!(
            simulation = %self.id,
            step = self.steps_run,
            population = report.population,
            vegetation = report.vegetation,
            yield_ = report.yield_,
            grown = report.grown,
            decayed = report.decayed,
            seeded = report.seeded,
            eaten = report.eaten,
            level_ups = report.level_ups,
            splits = report.splits,
            deaths = report.deaths + report.fished_out,
            spawned = report.spawned,
            "Step complete"
        );

        Ok(report)
    }

    /// Run `steps` steps and summarize them.
    #[instrument(skip(self), fields(simulation = %self.id))]
    pub fn advance(&mut self, steps: i64) -> Result<Results> {
        if !(0..=MAX_STEPS_PER_CALL).contains(&steps) {
            return Err(Error::InvalidStepCount(steps));
        }

        let mut stats = RunStatistics::new();
        for _ in 0..steps {
            let report = self.step()?;
            stats.record(report.population, report.yield_, report.vegetation);
        }

        let results = stats.finish();
        info!(
            steps,
            mean_fish = results.fish.mean,
            mean_yield = results.yield_.mean,
            mean_vegetation = results.vegetation.mean,
            extinction_steps = results.extinction_steps,
            "Advance complete"
        );

        Ok(results)
    }

    /// Vegetation levels, row-major.
    pub fn vegetation_snapshot(&self) -> Vec<i32> {
        self.ecosystem.grid().vegetation_levels()
    }

    /// Live pools in registry order with row-major positions.
    pub fn fish_population(&self) -> FishPopulation {
        let shape = self.ecosystem.grid().shape();
        let entries: Vec<PoolEntry> = self
            .ecosystem
            .pools()
            .iter()
            .map(|(_, pool)| PoolEntry {
                index: shape.external_index(pool.position()),
                pop_level: pool.pop_level,
            })
            .collect();

        if entries.is_empty() {
            FishPopulation::Empty
        } else {
            FishPopulation::Pools(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use fishery_core::{GridShape, Position};

    #[test]
    fn test_zero_steps_gives_zero_results() {
        let mut sim = SimulationState::new(SimulationId(1), Settings::default(), 42).unwrap();
        let veg_before = sim.vegetation_snapshot();

        let results = sim.advance(0).unwrap();

        assert_eq!(results, Results::default());
        assert_eq!(results.fish.mean, 0.0);
        assert_eq!(sim.vegetation_snapshot(), veg_before);
        assert_eq!(sim.steps_run(), 0);
    }

    #[test]
    fn test_step_count_bounds() {
        let mut sim = SimulationState::new(SimulationId(1), Settings::default(), 42).unwrap();

        assert!(matches!(sim.advance(-1), Err(Error::InvalidStepCount(-1))));
        assert!(matches!(
            sim.advance(MAX_STEPS_PER_CALL + 1),
            Err(Error::InvalidStepCount(_))
        ));
        assert_eq!(sim.steps_run(), 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            fish_moves_turn: -1,
            fishing_chance: 5.0,
            ..Default::default()
        };

        match SimulationState::new(SimulationId(1), settings, 42) {
            Err(Error::InvalidSettings(violations)) => assert_eq!(violations.len(), 2),
            other => panic!("expected InvalidSettings, got {other:?}"),
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = SimulationState::new(SimulationId(1), Settings::default(), 7).unwrap();
        let mut b = SimulationState::new(SimulationId(2), Settings::default(), 7).unwrap();

        assert_eq!(a.advance(50).unwrap(), b.advance(50).unwrap());
        assert_eq!(a.vegetation_snapshot(), b.vegetation_snapshot());
        assert_eq!(a.fish_population(), b.fish_population());
    }

    #[test]
    fn test_results_count_steps() {
        let mut sim = SimulationState::new(SimulationId(1), Settings::default(), 3).unwrap();

        let results = sim.advance(25).unwrap();
        sim.advance(5).unwrap();

        assert_eq!(results.steps, 25);
        assert_eq!(sim.steps_run(), 30);
        assert!(results.extinction_steps <= results.steps);
        assert!(results.fish.std_dev >= 0.0);
    }

    #[test]
    fn test_no_fishing_gives_no_yield() {
        let settings = Settings {
            fishing_chance: 0.0,
            ..Default::default()
        };
        let mut sim = SimulationState::new(SimulationId(1), settings, 11).unwrap();

        let results = sim.advance(40).unwrap();

        assert_eq!(results.yield_, Default::default());
    }

    #[test]
    fn test_empty_world_counts_extinction() {
        let settings = Settings {
            initial_fish_size: 0,
            random_fishes_interval: 0,
            ..Default::default()
        };
        let mut sim = SimulationState::new(SimulationId(1), settings, 1).unwrap();

        let results = sim.advance(10).unwrap();

        assert_eq!(results.extinction_steps, 10);
        assert_eq!(results.fish.total, 0);
        assert!(sim.fish_population().is_empty());
        assert!(sim.fish_population().entries().is_empty());
    }

    #[test]
    fn test_fish_population_uses_row_major_index() {
        let settings = Settings {
            size_x: 4,
            size_y: 3,
            initial_vegetation_size: 0,
            initial_fish_size: 0,
            ..Default::default()
        };
        let mut eco = Ecosystem::new(TileGrid::new(GridShape::new(4, 3), 0));
        let id = eco.spawn_pool(Position::new(1, 2)).unwrap();
        eco.pool_mut(id).unwrap().pop_level = 3;
        eco.grid_mut().tile_mut(Position::new(3, 0)).vegetation_level = 4;
        let sim = SimulationState::from_parts(SimulationId(1), settings, eco, 0);

        assert_eq!(
            sim.fish_population(),
            FishPopulation::Pools(vec![PoolEntry { index: 9, pop_level: 3 }])
        );
        let snapshot = sim.vegetation_snapshot();
        assert_eq!(snapshot.len(), 12);
        assert_eq!(snapshot[3], 4);
        assert_eq!(snapshot.iter().sum::<i32>(), 4);
    }

    #[test]
    fn test_step_report_counts_vegetation_and_feeding() {
        let settings = Settings {
            size_x: 3,
            size_y: 3,
            initial_vegetation_size: 0,
            initial_fish_size: 0,
            random_fishes_interval: 0,
            fishing_chance: 0.0,
            ..Default::default()
        };
        let mut eco = Ecosystem::new(TileGrid::new(GridShape::new(3, 3), 3));
        eco.grid_mut().tile_mut(Position::new(1, 1)).vegetation_level = 5;
        eco.spawn_pool(Position::new(0, 0)).unwrap();
        let mut sim = SimulationState::from_parts(SimulationId(1), settings, eco, 0);

        let report = sim.step().unwrap();

        // The level-5 tile seeds all eight neighbours but cannot afford to grow.
        assert_eq!((report.grown, report.decayed, report.seeded), (0, 0, 8));
        // One level from the freshly seeded home tile, then three from the
        // lush centre after a single move; the full pool levels up once.
        assert_eq!(report.eaten, 4);
        assert_eq!(report.moves, 1);
        assert_eq!(report.level_ups, 1);
        assert_eq!(report.population, 2);
    }

    #[test]
    fn test_step_report_matches_world() {
        let mut sim = SimulationState::new(SimulationId(1), Settings::default(), 21).unwrap();

        for _ in 0..20 {
            let report = sim.step().unwrap();
            assert_eq!(report.vegetation, sim.ecosystem().total_vegetation());
            assert_eq!(
                report.population - report.yield_,
                sim.ecosystem().total_population()
            );
        }
    }
}
