//! Bounded, de-duplicated waypoint history for one entity.

use crate::models::Waypoint;
use std::collections::VecDeque;

/// Result of offering a waypoint to a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// The waypoint was stored. `evicted` holds the oldest waypoint if the
    /// trajectory was full.
    Appended { evicted: Option<Waypoint> },
    /// Same position as the last stored waypoint; nothing changed.
    Duplicate,
}

impl AppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, AppendOutcome::Appended { .. })
    }
}

/// Chronological waypoint sequence capped at `max_points`.
#[derive(Debug, Clone)]
pub struct Trajectory {
    points: VecDeque<Waypoint>,
    max_points: usize,
}

impl Trajectory {
    pub fn new(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            points: VecDeque::with_capacity(max_points.min(64)),
            max_points,
        }
    }

    /// Append a waypoint unless its position equals the last stored one.
    pub fn push(&mut self, waypoint: Waypoint) -> AppendOutcome {
        if self
            .points
            .back()
            .is_some_and(|last| last.position == waypoint.position)
        {
            return AppendOutcome::Duplicate;
        }

        self.points.push_back(waypoint);
        let evicted = if self.points.len() > self.max_points {
            self.points.pop_front()
        } else {
            None
        };
        AppendOutcome::Appended { evicted }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.points.iter()
    }

    /// Owned copy of the waypoints in chronological order.
    pub fn to_vec(&self) -> Vec<Waypoint> {
        self.points.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
