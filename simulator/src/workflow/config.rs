use crate::generator::schedule::GeneratorConfig;
use anyhow::{bail, Context};
use fleetcore::FleetConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const TICK_EPSILON: f64 = 1e-9;

/// Everything one replay needs: core configuration, the simulated time
/// span, and how to synthesize a fleet when no snapshot is supplied.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub fleet: FleetConfig,
    pub start_time: f64,
    pub end_time: f64,
    /// Simulation minutes advanced per tick.
    pub step_minutes: f64,
    /// Wall-clock tick length in real-time mode.
    pub tick_ms: u64,
    pub generator: GeneratorConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fleet: FleetConfig::default(),
            start_time: 0.0,
            end_time: 240.0,
            step_minutes: 1.0,
            tick_ms: 50,
            generator: GeneratorConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading run config {}", path_ref.display()))?;
        let config: RunConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing run config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(start_time: f64, end_time: f64, step_minutes: f64) -> Self {
        Self {
            start_time,
            end_time,
            step_minutes,
            generator: GeneratorConfig {
                start_time,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.fleet.validate().context("validating fleet config")?;
        if !(self.step_minutes.is_finite() && self.step_minutes > 0.0) {
            bail!("step_minutes must be positive, got {}", self.step_minutes);
        }
        if !(self.start_time.is_finite() && self.end_time.is_finite()) {
            bail!("simulation span must be finite");
        }
        if self.end_time < self.start_time {
            bail!(
                "end_time {} is before start_time {}",
                self.end_time,
                self.start_time
            );
        }
        if self.tick_ms == 0 {
            bail!("tick_ms must be at least 1");
        }
        Ok(())
    }

    /// Simulation instants visited by the replay, both ends included.
    pub fn tick_times(&self) -> impl Iterator<Item = f64> + '_ {
        // Spans like 0.3 / 0.1 divide to just under a whole number.
        let ratio = (self.end_time - self.start_time) / self.step_minutes;
        let steps = (ratio + TICK_EPSILON).floor() as usize;
        (0..=steps).map(move |step| {
            (self.start_time + step as f64 * self.step_minutes).min(self.end_time)
        })
    }
}
