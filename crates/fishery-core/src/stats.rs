//! Statistics aggregated over a simulation run.

use serde::{Deserialize, Serialize};

/// Total, mean and standard deviation of one per-step quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Sum over all steps
    pub total: i64,
    /// Mean per step
    pub mean: f64,
    /// Population standard deviation across steps
    pub std_dev: f64,
}

/// Results of advancing a simulation some number of steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Total fish population level per step
    pub fish: MetricSummary,
    /// Fishing yield per step
    pub yield_: MetricSummary,
    /// Total vegetation level per step
    pub vegetation: MetricSummary,
    /// Steps run
    pub steps: u32,
    /// Steps that ended with no fish alive
    pub extinction_steps: u32,
}

impl Results {
    /// Flattened in the order external callers receive them:
    /// fish, yield, vegetation totals, their deviations, steps, extinctions.
    pub fn as_tuple(&self) -> (i64, i64, i64, f64, f64, f64, u32, u32) {
        (
            self.fish.total,
            self.yield_.total,
            self.vegetation.total,
            self.fish.std_dev,
            self.yield_.std_dev,
            self.vegetation.std_dev,
            self.steps,
            self.extinction_steps,
        )
    }
}

/// Running sum and sum of squares of one quantity.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    sum: i64,
    sum_sq: f64,
}

impl Moments {
    fn push(&mut self, value: i64) {
        self.sum += value;
        self.sum_sq += (value as f64) * (value as f64);
    }

    fn summarize(&self, n: u32) -> MetricSummary {
        if n == 0 {
            return MetricSummary::default();
        }
        let n = n as f64;
        let mean = self.sum as f64 / n;
        // Rounding can push the variance of a constant series just below zero.
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        MetricSummary {
            total: self.sum,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Accumulates per-step samples into [`Results`].
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    fish: Moments,
    yield_: Moments,
    vegetation: Moments,
    steps: u32,
    extinction_steps: u32,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the totals observed at the end of one step.
    pub fn record(&mut self, population: i64, yield_: i64, vegetation: i64) {
        self.fish.push(population);
        self.yield_.push(yield_);
        self.vegetation.push(vegetation);
        self.steps += 1;
        if population == 0 {
            self.extinction_steps += 1;
        }
    }

    pub fn finish(&self) -> Results {
        Results {
            fish: self.fish.summarize(self.steps),
            yield_: self.yield_.summarize(self.steps),
            vegetation: self.vegetation.summarize(self.steps),
            steps: self.steps,
            extinction_steps: self.extinction_steps,
        }
    }
}
