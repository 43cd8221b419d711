//! Interactive tools: the waypoint path builder and the ruler.
//!
//! `ToolState` holds the active [`ToolKind`] plus the state of every tool.
//! Tool data lives beside the `ToolKind`, not inside its variants: waypoints and
//! ruler points survive tool switches, and the active kind only decides who
//! receives pointer events.
//!
//! All positions handled here are already in world space. Screen → world
//! conversion happens in the engine, through the camera, before a tool sees
//! a point.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;

use serde::{Deserialize, Serialize};

use crate::camera::WorldPoint;
use crate::input::Button;

/// Which tool receives secondary-button pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Pointer events only pan.
    #[default]
    None,
    /// Secondary-button release appends a waypoint.
    WaypointBuilder,
    /// Secondary-button press starts a measurement; release ends it.
    Ruler,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("waypoint index {index} out of range (path has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

// =============================================================
// Waypoint path
// =============================================================

/// Ordered world-space waypoints with a running total length.
///
/// `length()` always equals the sum of distances between consecutive points.
/// It is maintained incrementally on every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointPath {
    points: Vec<WorldPoint>,
    length: f64,
}

impl WaypointPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `p`, extending the length by the distance from the previous last point.
    pub fn push(&mut self, p: WorldPoint) {
        if let Some(&last) = self.points.last() {
            self.length += last.distance(p);
        }
        self.points.push(p);
    }

    /// Remove and return the point at `index`.
    ///
    /// The two legs touching the removed point are replaced by the direct leg
    /// between its neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::IndexOutOfRange`] without mutating when `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<WorldPoint, ToolError> {
        let len = self.points.len();
        if index >= len {
            return Err(ToolError::IndexOutOfRange { index, len });
        }
        let prev = index.checked_sub(1).map(|i| self.points[i]);
        let next = self.points.get(index + 1).copied();
        let removed = self.points.remove(index);

        if let Some(prev) = prev {
            self.length -= prev.distance(removed);
        }
        if let Some(next) = next {
            self.length -= removed.distance(next);
        }
        if let (Some(prev), Some(next)) = (prev, next) {
            self.length += prev.distance(next);
        }
        if self.points.len() < 2 {
            // Drop accumulated rounding once no legs remain.
            self.length = 0.0;
        }
        Ok(removed)
    }

    /// Remove every point and reset the length.
    pub fn clear(&mut self) {
        self.points.clear();
        self.length = 0.0;
    }

    #[must_use]
    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    /// Running total length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Sum of consecutive distances computed from scratch.
    #[must_use]
    pub fn recomputed_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One `X, Y` line per waypoint with two decimals, ready for the clipboard.
    #[must_use]
    pub fn to_clipboard_text(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{:06.2}, {:06.2}\n", p.x, p.y))
            .collect()
    }
}

// =============================================================
// Ruler
// =============================================================

/// Two independently settable world points and the distance between them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ruler {
    pub start: WorldPoint,
    pub end: WorldPoint,
}

impl Ruler {
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.start.distance(self.end)
    }
}

// =============================================================
// Tool state machine
// =============================================================

/// Active tool, every tool's accumulated state, and the waypoint selection.
#[derive(Debug, Clone, Default)]
pub struct ToolState {
    active: ToolKind,
    waypoints: WaypointPath,
    ruler: Ruler,
    selected: Option<usize>,
}

impl ToolState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> ToolKind {
        self.active
    }

    /// Switch tools. Accumulated waypoints and ruler points are kept.
    pub fn set_active(&mut self, tool: ToolKind) {
        self.active = tool;
    }

    #[must_use]
    pub fn waypoints(&self) -> &WaypointPath {
        &self.waypoints
    }

    #[must_use]
    pub fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    /// Index of the selected waypoint, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Handle a button press at world position `at`.
    ///
    /// Returns `true` if tool state changed. With the ruler active, a
    /// secondary press sets the ruler start.
    pub fn pointer_down(&mut self, at: WorldPoint, button: Button) -> bool {
        match (self.active, button) {
            (ToolKind::Ruler, Button::Secondary) => {
                self.ruler.start = at;
                true
            }
            _ => false,
        }
    }

    /// Drag the ruler end while a measurement is in progress.
    pub fn measure_to(&mut self, at: WorldPoint) -> bool {
        if self.active != ToolKind::Ruler {
            return false;
        }
        self.ruler.end = at;
        true
    }

    /// Handle a button release at world position `at`.
    ///
    /// Returns `true` if tool state changed. The waypoint builder appends on
    /// secondary release. The ruler fixes its end.
    pub fn pointer_up(&mut self, at: WorldPoint, button: Button) -> bool {
        match (self.active, button) {
            (ToolKind::WaypointBuilder, Button::Secondary) => {
                self.waypoints.push(at);
                true
            }
            (ToolKind::Ruler, Button::Secondary) => {
                self.ruler.end = at;
                true
            }
            _ => false,
        }
    }

    /// Select the waypoint at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::IndexOutOfRange`] and leaves the selection unchanged.
    pub fn select_waypoint(&mut self, index: usize) -> Result<(), ToolError> {
        let len = self.waypoints.len();
        if index >= len {
            return Err(ToolError::IndexOutOfRange { index, len });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Delete the waypoint at `index`, keeping the selection aligned.
    ///
    /// Deleting the selected waypoint clears the selection; deleting one before
    /// it shifts the selection down by one.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::IndexOutOfRange`] without mutating.
    pub fn delete_waypoint(&mut self, index: usize) -> Result<WorldPoint, ToolError> {
        let removed = self.waypoints.remove(index)?;
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Empty the waypoint path and drop the selection.
    pub fn clear_waypoints(&mut self) {
        self.waypoints.clear();
        self.selected = None;
    }
}
