use super::history::{CorrectionEntry, CorrectionHistory, CorrectionKind};
use super::validator::BoundsValidator;
use crate::fleet::VehicleRecord;
use crate::geometry::Position;
use serde::Serialize;

pub const UNIDENTIFIED: &str = "unidentified";

/// Per-vehicle validity summary shown on the debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleDiagnostics {
    pub id: String,
    pub trackable: bool,
    pub location_valid: bool,
    pub route_valid: bool,
    pub corrected_location: Option<Position>,
    pub invalid_route_nodes: usize,
    /// Nodes whose time window is inverted or non-finite.
    pub malformed_windows: usize,
    pub total_route_nodes: usize,
    pub messages: Vec<String>,
}

impl VehicleDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.trackable && self.location_valid && self.route_valid
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub corrected: usize,
    pub total_corrections: usize,
}

/// Outcome of validating one polling snapshot of the fleet.
///
/// `corrected` holds one repaired copy per input record, in input order,
/// including untrackable records so indices line up with `results`.
#[derive(Debug, Clone)]
pub struct FleetReport {
    pub results: Vec<VehicleDiagnostics>,
    pub corrected: Vec<VehicleRecord>,
    pub summary: FleetSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleIssues {
    pub id: String,
    pub issues: Vec<String>,
    pub severity: Severity,
}

impl BoundsValidator {
    pub fn validate_vehicle(&self, record: &VehicleRecord) -> VehicleDiagnostics {
        let total_route_nodes = record.route.len();
        let Some(identifier) = record.identifier() else {
            return VehicleDiagnostics {
                id: UNIDENTIFIED.to_string(),
                trackable: false,
                location_valid: false,
                route_valid: false,
                corrected_location: None,
                invalid_route_nodes: 0,
                malformed_windows: 0,
                total_route_nodes,
                messages: vec!["record has no code or id".to_string()],
            };
        };

        let mut diagnostics = VehicleDiagnostics {
            id: identifier.to_string(),
            trackable: true,
            location_valid: true,
            route_valid: true,
            corrected_location: None,
            invalid_route_nodes: 0,
            malformed_windows: 0,
            total_route_nodes,
            messages: Vec::new(),
        };

        match &record.current_location {
            Some(location) => {
                let check = self.check_position(location);
                if let Some(message) = check.message() {
                    diagnostics.location_valid = false;
                    diagnostics.corrected_location = check.corrected;
                    diagnostics.messages.push(message);
                }
            }
            None => diagnostics.messages.push("no current location".to_string()),
        }

        let invalid_route_nodes = record
            .route
            .iter()
            .filter(|waypoint| !self.bounds().contains_position(&waypoint.position))
            .count();
        if invalid_route_nodes > 0 {
            diagnostics.route_valid = false;
            diagnostics.invalid_route_nodes = invalid_route_nodes;
            diagnostics
                .messages
                .push(format!("{} route nodes corrected", invalid_route_nodes));
        }

        let malformed_windows = record
            .route
            .iter()
            .filter(|waypoint| !waypoint.has_valid_window())
            .count();
        if malformed_windows > 0 {
            diagnostics.route_valid = false;
            diagnostics.malformed_windows = malformed_windows;
            diagnostics
                .messages
                .push(format!("{} malformed time windows repaired", malformed_windows));
        }

        diagnostics
    }

    /// Validates every record of a snapshot, producing repaired copies and
    /// feeding each repair into `history`, stamped with `time`.
    pub fn validate_fleet(
        &self,
        records: &[VehicleRecord],
        time: f64,
        history: &mut CorrectionHistory,
    ) -> FleetReport {
        let mut results = Vec::with_capacity(records.len());
        let mut corrected = Vec::with_capacity(records.len());
        let mut summary = FleetSummary {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            let diagnostics = self.validate_vehicle(record);
            let mut repaired = record.clone();
            let mut touched = false;

            let location_fix = (record.current_location, diagnostics.corrected_location);
            if let (Some(from), Some(to)) = location_fix {
                repaired.current_location = Some(to);
                touched = true;
                summary.total_corrections += 1;
                history.record(CorrectionEntry {
                    vehicle_id: diagnostics.id.clone(),
                    kind: CorrectionKind::CurrentLocation,
                    from,
                    to,
                    time,
                });
            }

            if diagnostics.invalid_route_nodes > 0 || diagnostics.malformed_windows > 0 {
                let validation = self.validate_route(&record.route);
                summary.total_corrections += validation.corrections.len();
                for correction in &validation.corrections {
                    history.record(CorrectionEntry {
                        vehicle_id: diagnostics.id.clone(),
                        kind: CorrectionKind::RouteNode(correction.waypoint_id),
                        from: correction.original,
                        to: correction.corrected,
                        time,
                    });
                }
                repaired.route = validation.route;
                touched = true;
            }

            if touched {
                summary.corrected += 1;
            }
            if diagnostics.location_valid && diagnostics.route_valid {
                summary.valid += 1;
            }
            results.push(diagnostics);
            corrected.push(repaired);
        }

        summary.invalid = summary.total - summary.valid;
        FleetReport {
            results,
            corrected,
            summary,
        }
    }

    /// Vehicles with at least one data problem, most severe first, ranked by
    /// how badly the rendered picture could mislead an operator. Equal
    /// severities keep input order.
    pub fn problematic_vehicles(&self, records: &[VehicleRecord]) -> Vec<VehicleIssues> {
        let mut problems: Vec<VehicleIssues> = records
            .iter()
            .filter_map(|record| {
                let diagnostics = self.validate_vehicle(record);
                let mut issues = Vec::new();
                let mut severity = Severity::Low;

                if !diagnostics.trackable {
                    issues.push("no identifier".to_string());
                    severity = Severity::High;
                }
                if diagnostics.trackable && !diagnostics.location_valid {
                    issues.push("current location outside bounds".to_string());
                    severity = Severity::High;
                }
                if diagnostics.invalid_route_nodes > 0 {
                    issues.push(format!(
                        "{} invalid route nodes",
                        diagnostics.invalid_route_nodes
                    ));
                    let share = diagnostics.invalid_route_nodes as f64
                        / diagnostics.total_route_nodes as f64;
                    let route_severity = if share > 0.5 {
                        Severity::High
                    } else {
                        Severity::Medium
                    };
                    severity = severity.max(route_severity);
                }
                if diagnostics.malformed_windows > 0 {
                    issues.push(format!(
                        "{} malformed time windows",
                        diagnostics.malformed_windows
                    ));
                    severity = severity.max(Severity::Medium);
                }

                (!issues.is_empty()).then(|| VehicleIssues {
                    id: diagnostics.id,
                    issues,
                    severity,
                })
            })
            .collect();
        problems.sort_by(|a, b| b.severity.cmp(&a.severity));
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{Route, Waypoint};
    use crate::geometry::Bounds;

    fn route(points: &[(f64, f64)]) -> Route {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let t = i as f64 * 10.0;
                Waypoint::new(i as i64 + 1, Position::new(x, y), t, t + 5.0)
            })
            .collect()
    }

    #[test]
    fn diagnostics_count_corrected_nodes() {
        let validator = BoundsValidator::new(Bounds::default());
        let record = VehicleRecord::new("TA01", route(&[(1.0, 1.0), (90.0, 1.0), (1.0, -2.0)]))
            .with_current_location(Position::new(5.0, 5.0));

        let diagnostics = validator.validate_vehicle(&record);
        assert!(diagnostics.location_valid);
        assert!(!diagnostics.route_valid);
        assert_eq!(diagnostics.invalid_route_nodes, 2);
        assert_eq!(diagnostics.total_route_nodes, 3);
        assert!(!diagnostics.is_clean());
    }

    #[test]
    fn fleet_report_repairs_and_records_history() {
        let validator = BoundsValidator::new(Bounds::default());
        let records = vec![
            VehicleRecord::new("TA01", route(&[(1.0, 1.0), (2.0, 2.0)])),
            VehicleRecord::new("TB02", route(&[(100.0, 1.0)]))
                .with_current_location(Position::new(-5.0, 60.0)),
            VehicleRecord::default(),
        ];
        let mut history = CorrectionHistory::default();

        let report = validator.validate_fleet(&records, 1440.0, &mut history);
        assert_eq!(
            report.summary,
            FleetSummary {
                total: 3,
                valid: 1,
                invalid: 2,
                corrected: 1,
                total_corrections: 2,
            }
        );
        assert_eq!(
            report.corrected[1].current_location,
            Some(Position::new(0.0, 50.0))
        );
        assert_eq!(
            report.corrected[1].route.waypoints()[0].position,
            Position::new(70.0, 1.0)
        );
        assert!(!report.results[2].trackable);
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|entry| entry.time == 1440.0));
    }

    #[test]
    fn problem_severity_follows_share_of_bad_nodes() {
        let validator = BoundsValidator::new(Bounds::default());
        let records = vec![
            VehicleRecord::new("OK", route(&[(1.0, 1.0)])),
            VehicleRecord::new("FEW", route(&[(1.0, 1.0), (2.0, 2.0), (80.0, 2.0)])),
            VehicleRecord::new("MANY", route(&[(80.0, 1.0), (90.0, 2.0), (2.0, 2.0)])),
            VehicleRecord::new("LOST", Route::default())
                .with_current_location(Position::new(-1.0, 0.0)),
            VehicleRecord::default(),
        ];

        let issues = validator.problematic_vehicles(&records);
        let ranked: Vec<_> = issues
            .iter()
            .map(|issue| (issue.id.as_str(), issue.severity))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("MANY", Severity::High),
                ("LOST", Severity::High),
                (UNIDENTIFIED, Severity::High),
                ("FEW", Severity::Medium),
            ]
        );
    }

    #[test]
    fn malformed_windows_mark_route_invalid_and_get_repaired() {
        let validator = BoundsValidator::new(Bounds::default());
        let route = Route::new(vec![
            Waypoint::new(1, Position::new(1.0, 1.0), 0.0, 5.0),
            Waypoint::new(2, Position::new(2.0, 2.0), 30.0, 20.0),
            Waypoint::new(3, Position::new(3.0, 3.0), f64::NAN, 50.0),
        ]);
        let records = vec![VehicleRecord::new("TC03", route)];

        let diagnostics = validator.validate_vehicle(&records[0]);
        assert_eq!(diagnostics.invalid_route_nodes, 0);
        assert_eq!(diagnostics.malformed_windows, 2);
        assert!(!diagnostics.route_valid);

        let mut history = CorrectionHistory::default();
        let report = validator.validate_fleet(&records, 0.0, &mut history);
        assert_eq!(report.summary.corrected, 1);
        assert_eq!(report.summary.valid, 0);
        assert!(report.corrected[0]
            .route
            .iter()
            .all(|waypoint| waypoint.has_valid_window()));
        assert!(history.is_empty());

        let issues = validator.problematic_vehicles(&records);
        assert_eq!(issues[0].severity, Severity::Medium);
    }
}
