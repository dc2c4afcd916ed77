//! Configuration types for the simulation.

use crate::error::{Error, Result, SettingViolation};
use crate::types::GridShape;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Largest number of steps a single advance call may run.
pub const MAX_STEPS_PER_CALL: i64 = 100_000;

/// Settings for one simulation run.
///
/// Integer fields are signed so that out-of-range input coming from a
/// configuration source can be reported instead of wrapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Width of the tile grid
    pub size_x: i32,
    /// Height of the tile grid
    pub size_y: i32,

    /// Tiles seeded with level-1 vegetation at creation
    pub initial_vegetation_size: i32,
    pub vegetation_level_max: i32,
    /// Level at which a tile seeds its empty neighbours
    pub vegetation_level_spread_at: i32,
    pub vegetation_level_growth_req: i32,
    pub soil_energy_max: i32,
    pub soil_energy_increase_turn: i32,
    /// Soil energy a tile uses up to hold each vegetation level, indexed by level
    pub vegetation_consumption: Vec<i32>,

    /// Pools placed at creation
    pub initial_fish_size: i32,
    pub fish_level_max: i32,
    pub fish_growth_req: i32,
    /// Foraging iterations a pool gets per step
    pub fish_moves_turn: i32,
    /// Food a pool eats per step, indexed by pop level
    pub fish_consumption: Vec<i32>,

    /// Chance in percent that a random pool spawns in a step
    pub random_fishes_interval: i32,
    /// Non-zero enables splitting of pools at the maximum level
    pub split_fishes_at_max: i32,

    /// Chance (0.0 to 1.0) that a pool loses one level to fishing each step
    pub fishing_chance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size_x: 10,
            size_y: 10,
            initial_vegetation_size: 10,
            vegetation_level_max: 5,
            vegetation_level_spread_at: 3,
            vegetation_level_growth_req: 3,
            soil_energy_max: 10,
            soil_energy_increase_turn: 3,
            vegetation_consumption: vec![0, 1, 1, 2, 2, 3],
            initial_fish_size: 10,
            fish_level_max: 5,
            fish_growth_req: 2,
            fish_moves_turn: 3,
            fish_consumption: vec![0, 1, 2, 3, 4, 5],
            random_fishes_interval: 10,
            split_fishes_at_max: 1,
            fishing_chance: 0.1,
        }
    }
}

impl Settings {
    /// Canonical order of the setting names.
    pub const FIELD_ORDER: [&'static str; 17] = [
        "size_x",
        "size_y",
        "initial_vegetation_size",
        "vegetation_level_max",
        "vegetation_level_spread_at",
        "vegetation_level_growth_req",
        "soil_energy_max",
        "soil_energy_increase_turn",
        "vegetation_consumption",
        "initial_fish_size",
        "fish_level_max",
        "fish_growth_req",
        "fish_moves_turn",
        "fish_consumption",
        "random_fishes_interval",
        "split_fishes_at_max",
        "fishing_chance",
    ];

    /// Parse settings from JSON text. The result is not validated.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file. The result is not validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.size_x, self.size_y)
    }

    /// Soil energy consumed to hold vegetation at `level`.
    pub fn vegetation_consumption_at(&self, level: i32) -> i32 {
        let index = level.clamp(0, self.vegetation_level_max) as usize;
        self.vegetation_consumption[index]
    }

    /// Food eaten per step by a pool at `level`. Levels above the maximum
    /// cost the same as the maximum.
    pub fn fish_consumption_at(&self, level: i32) -> i32 {
        let index = level.clamp(0, self.fish_level_max) as usize;
        self.fish_consumption[index]
    }

    /// Food a pool at `level` tries to hold before it stops foraging.
    pub fn fish_appetite_at(&self, level: i32) -> i32 {
        self.fish_consumption_at(level) * 2 + self.fish_growth_req
    }

    pub fn splits_enabled(&self) -> bool {
        self.split_fishes_at_max != 0
    }

    /// Per-step probability of a random spawn.
    pub fn spawn_probability(&self) -> f64 {
        (self.random_fishes_interval as f64 / 100.0).clamp(0.0, 1.0)
    }

    /// Check every field against its accepted range, reporting all failures.
    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }
        for violation in &violations {
            warn!(field = violation.field, value = %violation.value, "Rejected setting");
        }
        Err(Error::InvalidSettings(violations))
    }

    fn violations(&self) -> Vec<SettingViolation> {
        let mut out = Vec::new();
        let area = self.size_x as i64 * self.size_y as i64;

        check_range(&mut out, "size_x", self.size_x, 1, 1000);
        check_range(&mut out, "size_y", self.size_y, 1, 1000);
        if self.initial_vegetation_size < 0 || self.initial_vegetation_size as i64 > area {
            out.push(SettingViolation::new(
                "initial_vegetation_size",
                self.initial_vegetation_size,
                format!("0..={}", area.max(0)),
            ));
        }
        check_range(&mut out, "vegetation_level_max", self.vegetation_level_max, 1, 100);
        if self.vegetation_level_spread_at < 0 {
            out.push(SettingViolation::new(
                "vegetation_level_spread_at",
                self.vegetation_level_spread_at,
                "a non-negative level",
            ));
        }
        check_range(&mut out, "vegetation_level_growth_req", self.vegetation_level_growth_req, 0, 100);
        check_table(&mut out, "vegetation_consumption", &self.vegetation_consumption, self.vegetation_level_max);
        check_range(&mut out, "soil_energy_increase_turn", self.soil_energy_increase_turn, 0, 100);
        check_range(&mut out, "soil_energy_max", self.soil_energy_max, 0, 1000);

        if self.initial_fish_size < 0 || self.initial_fish_size as i64 > area {
            out.push(SettingViolation::new(
                "initial_fish_size",
                self.initial_fish_size,
                format!("0..={}", area.max(0)),
            ));
        }
        check_range(&mut out, "fish_growth_req", self.fish_growth_req, 0, 100);
        check_range(&mut out, "fish_level_max", self.fish_level_max, 0, 100);
        check_range(&mut out, "fish_moves_turn", self.fish_moves_turn, 0, 100);
        check_table(&mut out, "fish_consumption", &self.fish_consumption, self.fish_level_max);
        check_range(&mut out, "random_fishes_interval", self.random_fishes_interval, 0, 1000);
        check_range(&mut out, "split_fishes_at_max", self.split_fishes_at_max, 0, self.fish_level_max.max(0));
        if !(0.0..=1.0).contains(&self.fishing_chance) {
            out.push(SettingViolation::new("fishing_chance", self.fishing_chance, "0.0..=1.0"));
        }

        out
    }
}

fn check_range(out: &mut Vec<SettingViolation>, field: &'static str, value: i32, min: i32, max: i32) {
    if value < min || value > max {
        out.push(SettingViolation::new(field, value, format!("{min}..={max}")));
    }
}

/// Lookup tables need one non-negative entry per level `0..=level_max`.
fn check_table(out: &mut Vec<SettingViolation>, field: &'static str, table: &[i32], level_max: i32) {
    if level_max < 0 {
        // The level bound itself is already reported.
        return;
    }
    let expected_len = level_max as usize + 1;
    if table.len() != expected_len {
        out.push(SettingViolation::new(
            field,
            format!("{} entries", table.len()),
            format!("{expected_len} entries"),
        ));
    }
    for (level, &value) in table.iter().enumerate() {
        if value < 0 {
            out.push(SettingViolation::new(
                field,
                format!("{value} at level {level}"),
                "non-negative entries",
            ));
        }
    }
}
