use crate::geometry::Position;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    CurrentLocation,
    RouteNode(i64),
}

/// A repair applied to one vehicle, stamped with the simulation time it was observed at.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionEntry {
    pub vehicle_id: String,
    pub kind: CorrectionKind,
    pub from: Position,
    pub to: Position,
    pub time: f64,
}

impl CorrectionEntry {
    pub fn message(&self) -> String {
        match self.kind {
            CorrectionKind::CurrentLocation => {
                format!("{}: current location {} -> {}", self.vehicle_id, self.from, self.to)
            }
            CorrectionKind::RouteNode(id) => {
                format!("{}: node {} {} -> {}", self.vehicle_id, id, self.from, self.to)
            }
        }
    }
}

/// Bounded log of recent corrections for the debug overlay. Once full, the
/// oldest entry is dropped for each new one.
#[derive(Debug, Clone)]
pub struct CorrectionHistory {
    entries: VecDeque<CorrectionEntry>,
    max_capacity: usize,
}

impl CorrectionHistory {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_capacity),
            max_capacity,
        }
    }

    pub fn record(&mut self, entry: CorrectionEntry) {
        if self.max_capacity == 0 {
            return;
        }
        if self.entries.len() == self.max_capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &CorrectionEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(count))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrectionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CorrectionHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(node: i64) -> CorrectionEntry {
        CorrectionEntry {
            vehicle_id: "TA01".into(),
            kind: CorrectionKind::RouteNode(node),
            from: Position::new(80.0, 1.0),
            to: Position::new(70.0, 1.0),
            time: node as f64,
        }
    }

    #[test]
    fn history_drops_oldest_when_full() {
        let mut history = CorrectionHistory::with_capacity(3);
        for node in 0..5 {
            history.record(entry(node));
        }
        assert_eq!(history.len(), 3);
        let kept: Vec<_> = history.iter().map(|e| e.kind).collect();
        assert_eq!(
            kept,
            vec![
                CorrectionKind::RouteNode(2),
                CorrectionKind::RouteNode(3),
                CorrectionKind::RouteNode(4)
            ]
        );
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut history = CorrectionHistory::default();
        for node in 0..4 {
            history.record(entry(node));
        }
        let tail: Vec<_> = history.recent(2).map(|e| e.time).collect();
        assert_eq!(tail, vec![2.0, 3.0]);
        assert_eq!(history.recent(10).count(), 4);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn message_names_vehicle_and_node() {
        assert_eq!(entry(7).message(), "TA01: node 7 (80.0, 1.0) -> (70.0, 1.0)");
    }
}
