//! Input model: buttons, keys, host events, UI commands, and the gesture state.
//!
//! The host windowing layer translates its native events into [`InputEvent`]s.
//! Pointer positions arrive in screen pixels; nothing in this module converts
//! them. `InputState` tracks the gesture in progress between a button press
//! and its release so that moves can be interpreted.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::ScreenPoint;
use crate::tools::ToolKind;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button. Always pans.
    Primary,
    /// Middle mouse button. Ignored.
    Middle,
    /// Right mouse button. Drives the active tool.
    Secondary,
}

/// A keyboard key as named by the host (e.g. `"Space"`, `"c"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    /// Space bar, under any of the common host spellings.
    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self.0.as_str(), " " | "Space" | "space")
    }

    /// The `C` key.
    #[must_use]
    pub fn is_c(&self) -> bool {
        matches!(self.0.as_str(), "c" | "C" | "KeyC")
    }
}

/// Commands issued by the surrounding UI (toolbar buttons, waypoint table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    SelectTool { tool: ToolKind },
    ClearWaypoints,
    SelectWaypoint { index: usize },
    DeleteWaypoint { index: usize },
    ToggleWireframe,
    ToggleRangeRings,
}

/// A host event in neutral form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { at: ScreenPoint, button: Button },
    PointerUp { at: ScreenPoint, button: Button },
    PointerMove { at: ScreenPoint },
    /// Vertical wheel delta; positive is wheel-up.
    Wheel { dy: f64 },
    Resize { width: f64, height: f64 },
    KeyDown { key: Key },
    KeyUp { key: Key },
    Ui(UiCommand),
    Quit,
}

/// Gesture in progress between a button press and its release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Primary button held; moves pan the camera.
    Panning {
        /// Pointer position at the previous event, used to compute the pan delta.
        last_screen: ScreenPoint,
    },
    /// Secondary button held with the ruler active; moves drag the ruler end.
    Measuring,
}
