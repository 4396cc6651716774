use anyhow::{bail, Context};
use fleetcore::fleet::{FaultState, LoadState, Route, VehicleRecord, Waypoint};
use fleetcore::geometry::{Bounds, Position};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::Path;

const FLEET_PREFIXES: [&str; 4] = ["TA", "TB", "TC", "TD"];

/// Configuration for generating synthetic fleet schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub vehicles: usize,
    pub stops_per_vehicle: usize,
    pub seed: u64,
    pub start_time: f64,
    pub depot: Position,
    pub min_travel: f64,
    pub max_travel: f64,
    pub dwell: f64,
    /// Share of delivery stops deliberately placed outside the bounds.
    pub out_of_bounds_share: f64,
    pub capacity: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vehicles: 4,
            stops_per_vehicle: 5,
            seed: 0,
            start_time: 0.0,
            depot: Position::new(12.0, 8.0),
            min_travel: 10.0,
            max_travel: 40.0,
            dwell: 15.0,
            out_of_bounds_share: 0.0,
            capacity: 25.0,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> anyhow::Result<()> {
        let finite = [
            ("start_time", self.start_time),
            ("min_travel", self.min_travel),
            ("max_travel", self.max_travel),
            ("dwell", self.dwell),
            ("capacity", self.capacity),
            ("depot.x", self.depot.x),
            ("depot.y", self.depot.y),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            bail!("{} must be finite, got {}", name, value);
        }
        if !(self.min_travel > 0.0 && self.min_travel <= self.max_travel) {
            bail!(
                "travel range must satisfy 0 < min <= max, got [{}, {}]",
                self.min_travel,
                self.max_travel
            );
        }
        if !(0.0..=1.0).contains(&self.out_of_bounds_share) {
            bail!(
                "out_of_bounds_share must be within [0, 1], got {}",
                self.out_of_bounds_share
            );
        }
        if self.dwell < 0.0 {
            bail!("dwell must not be negative, got {}", self.dwell);
        }
        if self.capacity < 0.0 {
            bail!("capacity must not be negative, got {}", self.capacity);
        }
        Ok(())
    }
}

fn random_stop(rng: &mut StdRng, bounds: &Bounds, stray: bool) -> Position {
    if stray {
        // Overshoot past the far edges by up to half the grid size.
        let x = bounds.max_x + rng.gen_range(0.5..=bounds.width().max(1.0) / 2.0);
        let y = bounds.max_y + rng.gen_range(0.5..=bounds.height().max(1.0) / 2.0);
        Position::new(x, y)
    } else {
        Position::new(
            rng.gen_range(bounds.min_x..=bounds.max_x).round(),
            rng.gen_range(bounds.min_y..=bounds.max_y).round(),
        )
    }
}

fn build_route(
    config: &GeneratorConfig,
    bounds: &Bounds,
    rng: &mut StdRng,
    order_base: usize,
) -> Route {
    let mut waypoints = Vec::with_capacity(config.stops_per_vehicle + 2);
    let mut clock = config.start_time;

    waypoints.push(Waypoint::new(0, config.depot, clock, clock).depot());

    for stop_index in 0..config.stops_per_vehicle {
        clock += rng.gen_range(config.min_travel..=config.max_travel);
        let stray = rng.gen_bool(config.out_of_bounds_share);
        let position = random_stop(rng, bounds, stray);
        let order = order_base + stop_index;
        let stop = Waypoint::new(stop_index as i64 + 1, position, clock, clock + config.dwell)
            .delivery_stop()
            .with_payload(json!({
                "order": format!("P-{:04}", order),
                "volume": rng.gen_range(1..=10),
            }));
        clock += config.dwell;
        waypoints.push(stop);
    }

    clock += rng.gen_range(config.min_travel..=config.max_travel);
    let last_id = config.stops_per_vehicle as i64 + 1;
    waypoints.push(Waypoint::new(last_id, config.depot, clock, clock).depot());

    Route::new(waypoints)
}

pub fn build_fleet(
    config: &GeneratorConfig,
    bounds: &Bounds,
) -> anyhow::Result<Vec<VehicleRecord>> {
    config.validate().context("validating generator config")?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let fleet = (0..config.vehicles)
        .map(|index| {
            let prefix = FLEET_PREFIXES[index % FLEET_PREFIXES.len()];
            let code = format!("{}{:02}", prefix, index / FLEET_PREFIXES.len() + 1);
            let route = build_route(config, bounds, &mut rng, index * config.stops_per_vehicle);
            let current_load = rng.gen_range(0.0..=config.capacity);
            VehicleRecord {
                load_state: Some(LoadState {
                    capacity: config.capacity,
                    current_load,
                    fuel_available: rng.gen_range(5.0..=50.0),
                }),
                fault_state: Some(FaultState::Operational),
                current_location: Some(config.depot),
                ..VehicleRecord::new(code, route)
            }
        })
        .collect();

    Ok(fleet)
}

/// Reads a backend snapshot: a JSON array of vehicle records.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<VehicleRecord>> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading fleet snapshot {}", path_ref.display()))?;
    let fleet = serde_json::from_str(&contents)
        .with_context(|| format!("parsing fleet snapshot {}", path_ref.display()))?;
    Ok(fleet)
}
