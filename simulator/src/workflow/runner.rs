use crate::frames::bridge::FrameBridge;
use crate::frames::model::{RejectedVehicle, TickFrame, VehicleFrame};
use crate::workflow::config::RunConfig;
use anyhow::Context;
use fleetcore::fleet::VehicleRecord;
use fleetcore::geometry::Position;
use fleetcore::resolver::{RouteResolver, RouteStats, Smoother};
use fleetcore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use fleetcore::validation::{CorrectionHistory, FleetSummary, VehicleDiagnostics, UNIDENTIFIED};
use fleetcore::FleetResult;
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

const RECENT_CORRECTIONS: usize = 10;

/// Smoothed marker positions, keyed by vehicle id. Owned by the caller and
/// threaded through every tick.
pub type DisplayState = HashMap<String, Position>;

/// A validated snapshot: repaired records in input order, each paired with
/// whether the original record may enter the resolver.
pub struct PreparedFleet {
    pub vehicles: Vec<VehicleRecord>,
    admission: Vec<FleetResult<()>>,
    pub summary: FleetSummary,
    pub diagnostics: Vec<VehicleDiagnostics>,
}

pub struct WorkflowResult {
    pub ticks: usize,
    pub last_frame: Option<TickFrame>,
    pub metrics: MetricsSnapshot,
    pub corrections_logged: usize,
}

pub struct Runner {
    config: RunConfig,
    resolver: RouteResolver,
    smoother: Smoother,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: RunConfig) -> anyhow::Result<Self> {
        config.validate().context("validating run config")?;
        let resolver = RouteResolver::from_config(&config.fleet);
        let smoother = Smoother::from_config(&config.fleet).context("building smoother")?;
        Ok(Self {
            config,
            resolver,
            smoother,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("runner"),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }

    /// Validates one backend snapshot. Runs once per snapshot, so each repair
    /// lands in `history` and the metrics exactly once, stamped with `time`.
    /// Admission is judged on the original records, so strict mode still
    /// sees the out-of-bounds data the repaired copies no longer carry.
    pub fn prepare(
        &self,
        fleet: &[VehicleRecord],
        time: f64,
        history: &mut CorrectionHistory,
    ) -> PreparedFleet {
        let validator = self.resolver.validator();
        let report = validator.validate_fleet(fleet, time, history);
        self.metrics.record_corrections(report.summary.total_corrections);

        let admission = fleet
            .iter()
            .map(|record| {
                let admitted = validator.admit_vehicle(record);
                if let Err(err) = &admitted {
                    let id = record.identifier().unwrap_or(UNIDENTIFIED);
                    self.logger.warn(&format!("skipping {}: {}", id, err));
                }
                admitted
            })
            .collect();

        let diagnostics = report
            .results
            .iter()
            .filter(|diagnostics| !diagnostics.is_clean())
            .cloned()
            .collect();

        PreparedFleet {
            vehicles: report.corrected,
            admission,
            summary: report.summary,
            diagnostics,
        }
    }

    /// Resolves every admitted vehicle against the same `time` and advances
    /// the smoothed display positions by one frame interval.
    pub fn tick(
        &self,
        prepared: &PreparedFleet,
        time: f64,
        display: &mut DisplayState,
    ) -> TickFrame {
        let mut vehicles = Vec::with_capacity(prepared.vehicles.len());
        let mut rejected = Vec::new();
        let dt = self.frame_interval();

        for (record, admitted) in prepared.vehicles.iter().zip(&prepared.admission) {
            let id = record.identifier().unwrap_or(UNIDENTIFIED).to_string();
            let resolved = admitted
                .clone()
                .and_then(|()| self.resolver.resolve_vehicle(record, time));
            match resolved {
                Ok(resolved) => {
                    self.metrics.record_resolved();
                    let displayed = self
                        .smoother
                        .step(resolved.position, display.get(&id).copied(), dt);
                    display.insert(id.clone(), displayed);
                    vehicles.push(VehicleFrame {
                        id,
                        position: resolved.position,
                        displayed,
                        state: resolved.state(),
                        progress: resolved.progress,
                        stats: RouteStats::compute(&record.route, time),
                    });
                }
                Err(err) => {
                    self.metrics.record_rejected();
                    rejected.push(RejectedVehicle {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        TickFrame {
            time,
            vehicles,
            rejected,
            summary: prepared.summary,
            diagnostics: prepared.diagnostics.clone(),
        }
    }

    fn publish(
        &self,
        bridge: &mut FrameBridge,
        frame: &TickFrame,
        history: &CorrectionHistory,
    ) -> anyhow::Result<()> {
        let recent = history
            .recent(RECENT_CORRECTIONS)
            .map(|entry| entry.message())
            .collect();
        bridge
            .publish(frame, self.metrics.snapshot(), recent)
            .with_context(|| format!("publishing frame at t={}", frame.time))
    }

    /// Replays the whole span as fast as possible.
    pub fn execute(
        &self,
        fleet: &[VehicleRecord],
        bridge: &mut FrameBridge,
    ) -> anyhow::Result<WorkflowResult> {
        let mut display = DisplayState::new();
        let mut history = CorrectionHistory::default();
        let prepared = self.prepare(fleet, self.config.start_time, &mut history);
        let mut ticks = 0;
        let mut last_frame = None;

        for time in self.config.tick_times() {
            let frame = self.tick(&prepared, time, &mut display);
            self.publish(bridge, &frame, &history)?;
            ticks += 1;
            last_frame = Some(frame);
        }
        bridge.flush()?;

        Ok(WorkflowResult {
            ticks,
            last_frame,
            metrics: self.metrics.snapshot(),
            corrections_logged: history.len(),
        })
    }

    /// Paces the replay on a wall-clock interval until the span ends or
    /// Ctrl+C arrives.
    pub fn execute_realtime(
        &self,
        fleet: &[VehicleRecord],
        bridge: &mut FrameBridge,
    ) -> anyhow::Result<WorkflowResult> {
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for the tick loop")?;

        runtime.block_on(async {
            let mut display = DisplayState::new();
            let mut history = CorrectionHistory::default();
            let prepared = self.prepare(fleet, self.config.start_time, &mut history);
            let mut ticks = 0;
            let mut last_frame = None;
            let mut times = self.config.tick_times();
            let mut interval = tokio::time::interval(self.frame_interval());
            let shutdown = signal::ctrl_c();
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let Some(time) = times.next() else {
                            break;
                        };
                        let frame = self.tick(&prepared, time, &mut display);
                        self.publish(bridge, &frame, &history)?;
                        ticks += 1;
                        last_frame = Some(frame);
                    }
                    result = &mut shutdown => {
                        result.context("awaiting Ctrl+C")?;
                        bridge.publish_status("interrupted, stopping tick loop");
                        break;
                    }
                }
            }
            bridge.flush()?;

            Ok::<_, anyhow::Error>(WorkflowResult {
                ticks,
                last_frame,
                metrics: self.metrics.snapshot(),
                corrections_logged: history.len(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::schedule::{build_fleet, GeneratorConfig};
    use fleetcore::fleet::{Route, Waypoint};
    use fleetcore::resolver::MotionState;

    fn two_stop_fleet() -> Vec<VehicleRecord> {
        let route = Route::new(vec![
            Waypoint::new(1, Position::new(10.0, 10.0), 0.0, 0.0),
            Waypoint::new(2, Position::new(20.0, 10.0), 60.0, 60.0),
        ]);
        vec![VehicleRecord::new("TA01", route)]
    }

    #[test]
    fn runner_tick_resolves_shared_time() {
        let runner = Runner::new(RunConfig::from_args(0.0, 60.0, 30.0)).unwrap();
        let mut display = DisplayState::new();
        let mut history = CorrectionHistory::default();
        let prepared = runner.prepare(&two_stop_fleet(), 0.0, &mut history);

        let frame = runner.tick(&prepared, 30.0, &mut display);
        assert_eq!(frame.vehicles.len(), 1);
        let vehicle = &frame.vehicles[0];
        assert_eq!(vehicle.position, Position::new(15.0, 10.0));
        assert_eq!(vehicle.state, MotionState::InTransit);
        assert_eq!(vehicle.progress, 0.5);
        assert_eq!(vehicle.displayed, vehicle.position);
        assert_eq!(display.get("TA01"), Some(&Position::new(15.0, 10.0)));
    }

    #[test]
    fn runner_skips_records_without_identifier() {
        let runner = Runner::new(RunConfig::from_args(0.0, 10.0, 5.0)).unwrap();
        let mut fleet = two_stop_fleet();
        fleet.push(VehicleRecord::default());
        let mut display = DisplayState::new();
        let mut history = CorrectionHistory::default();
        let prepared = runner.prepare(&fleet, 0.0, &mut history);

        let frame = runner.tick(&prepared, 0.0, &mut display);
        assert_eq!(frame.vehicles.len(), 1);
        assert_eq!(frame.rejected.len(), 1);
        assert_eq!(frame.rejected[0].id, UNIDENTIFIED);
        assert_eq!(frame.diagnostics.len(), 1);
    }

    #[test]
    fn strict_mode_rejects_out_of_bounds_vehicles() {
        let mut config = RunConfig::from_args(0.0, 10.0, 5.0);
        config.fleet.strict_mode = true;
        let runner = Runner::new(config).unwrap();
        let fleet = vec![VehicleRecord::new("TB02", Route::default())
            .with_current_location(Position::new(90.0, 10.0))];
        let mut display = DisplayState::new();
        let mut history = CorrectionHistory::default();
        let prepared = runner.prepare(&fleet, 0.0, &mut history);

        let frame = runner.tick(&prepared, 0.0, &mut display);
        assert!(frame.vehicles.is_empty());
        assert_eq!(frame.rejected[0].id, "TB02");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn repairs_are_recorded_once_per_snapshot() {
        let route = Route::new(vec![
            Waypoint::new(1, Position::new(10.0, 10.0), 0.0, 0.0),
            Waypoint::new(2, Position::new(1000.0, 1000.0), 60.0, 60.0),
        ]);
        let fleet = vec![VehicleRecord::new("TA01", route)];
        let runner = Runner::new(RunConfig::from_args(0.0, 120.0, 10.0)).unwrap();
        let mut bridge = FrameBridge::new(None);

        let result = runner.execute(&fleet, &mut bridge).unwrap();
        assert_eq!(result.ticks, 13);
        assert_eq!(result.metrics.corrections, 1);
        assert_eq!(result.corrections_logged, 1);
        assert_eq!(
            bridge.snapshot().recent_corrections,
            vec!["TA01: node 2 (1000.0, 1000.0) -> (70.0, 50.0)".to_string()]
        );

        let last = result.last_frame.unwrap();
        assert_eq!(last.summary.total_corrections, 1);
        assert_eq!(last.vehicles[0].position, Position::new(70.0, 50.0));
    }

    #[test]
    fn runner_executes_workflow() {
        let config = RunConfig::from_args(0.0, 120.0, 10.0);
        let generator = GeneratorConfig {
            out_of_bounds_share: 0.5,
            seed: 3,
            ..config.generator.clone()
        };
        let fleet = build_fleet(&generator, &config.fleet.bounds).unwrap();
        let runner = Runner::new(config.clone()).unwrap();
        let mut bridge = FrameBridge::new(None);

        let result = runner.execute(&fleet, &mut bridge).unwrap();
        assert_eq!(result.ticks, 13);
        assert_eq!(result.metrics.resolved, 13 * fleet.len());
        assert_eq!(result.metrics.rejected, 0);

        let last = result.last_frame.unwrap();
        assert_eq!(last.time, 120.0);
        for vehicle in &last.vehicles {
            assert!(config.fleet.bounds.contains_position(&vehicle.position));
            assert!(config.fleet.bounds.contains_position(&vehicle.displayed));
        }
        assert_eq!(bridge.snapshot().frames_published, 13);
    }

    #[test]
    fn realtime_replay_stops_at_end_of_span() {
        let mut config = RunConfig::from_args(0.0, 3.0, 1.0);
        config.tick_ms = 1;
        let expected: Vec<f64> = config.tick_times().collect();
        let runner = Runner::new(config).unwrap();
        let mut bridge = FrameBridge::new(None);

        let result = runner
            .execute_realtime(&two_stop_fleet(), &mut bridge)
            .unwrap();
        assert_eq!(result.ticks, expected.len());
        assert_eq!(result.ticks, 4);
        assert_eq!(result.metrics.resolved, 4);
        assert_eq!(result.last_frame.unwrap().time, 3.0);

        let model = bridge.snapshot();
        assert_eq!(model.frames_published, 4);
        assert_eq!(model.latest.map(|frame| frame.time), Some(3.0));
    }
}
