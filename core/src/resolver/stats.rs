use crate::fleet::Route;
use serde::Serialize;

/// Schedule progress summary for the vehicle detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteStats {
    pub total_nodes: usize,
    pub completed_nodes: usize,
    /// First node whose window has opened but not yet closed.
    pub current_node: Option<usize>,
    /// End of the last window, 0 for an empty route.
    pub estimated_completion: f64,
    /// Straight-line path length, rounded to two decimals.
    pub total_distance: f64,
}

impl RouteStats {
    pub fn compute(route: &Route, time: f64) -> Self {
        if route.is_empty() {
            return Self::default();
        }

        let completed_nodes = route.iter().filter(|stop| time >= stop.window_end).count();
        let current_node = route
            .iter()
            .position(|stop| time >= stop.window_start && time < stop.window_end);

        Self {
            total_nodes: route.len(),
            completed_nodes,
            current_node,
            estimated_completion: route.last().map_or(0.0, |stop| stop.window_end),
            total_distance: (route.path_length() * 100.0).round() / 100.0,
        }
    }

    pub fn remaining_nodes(&self) -> usize {
        self.total_nodes - self.completed_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Waypoint;
    use crate::geometry::Position;

    #[test]
    fn stats_track_schedule_progress() {
        let route = Route::new(vec![
            Waypoint::new(1, Position::new(0.0, 0.0), 0.0, 10.0),
            Waypoint::new(2, Position::new(1.0, 1.0), 20.0, 30.0),
            Waypoint::new(3, Position::new(2.0, 1.0), 40.0, 45.0),
        ]);

        let stats = RouteStats::compute(&route, 25.0);
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.completed_nodes, 1);
        assert_eq!(stats.current_node, Some(1));
        assert_eq!(stats.estimated_completion, 45.0);
        assert_eq!(stats.total_distance, 2.41);
        assert_eq!(stats.remaining_nodes(), 2);

        let between = RouteStats::compute(&route, 35.0);
        assert_eq!(between.completed_nodes, 2);
        assert_eq!(between.current_node, None);
    }

    #[test]
    fn empty_route_has_default_stats() {
        assert_eq!(RouteStats::compute(&Route::default(), 5.0), RouteStats::default());
    }
}
