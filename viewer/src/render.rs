//! Rendering: turns camera, mesh and tool state into an ordered draw list.
//!
//! [`build_frame`] is a pure function. It does not know about any graphics API;
//! every coordinate it emits is already in clip space, projected through
//! [`Camera::world_to_clip`]. That is the same camera the input path uses for
//! `screen_to_world`, so hit positions and drawn positions cannot drift apart.
//! Backends ([`crate::canvas2d`], or the headless host) only map clip space to
//! their surface.
//!
//! Draw order, bottom first:
//! 1. trapezoids, coloured by plane
//! 2. waypoint line strip
//! 3. waypoint markers
//! 4. range rings (optional)
//! 5. ruler endpoints (ruler tool only)

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use serde::Serialize;

use crate::camera::{Camera, ClipPoint, WorldPoint};
use crate::consts::{RANGE_RING_RADII, RANGE_RING_SEGMENTS, WAYPOINT_MARKER_RADIUS, WAYPOINT_MARKER_SEGMENTS};
use crate::mesh::{MeshView, Trapezoid};
use crate::tools::{ToolKind, ToolState};

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BACKGROUND: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Plane 0.
    pub const GROUND_PLANE: Self = Self::rgb(0.5, 0.5, 0.5);
    /// Any plane other than 0.
    pub const RAISED_PLANE: Self = Self::rgb(0.5, 0.0, 0.5);
    pub const WAYPOINT_PATH: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const WAYPOINT_MARKER: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const WAYPOINT_SELECTED: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const RANGE_RING: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RULER: Self = Self::rgb(1.0, 0.85, 0.0);

    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgb()` string.
    #[must_use]
    pub fn to_css(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round();
        format!("rgb({}, {}, {})", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Polygon fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    Solid,
    Outline,
}

/// One draw primitive. All points are in clip space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Closed polygon (trapezoid, marker disc).
    Polygon { points: Vec<ClipPoint>, color: Color, fill: Fill },
    /// Open poly-line through `points` in order.
    LineStrip { points: Vec<ClipPoint>, color: Color },
    /// A single pixel-sized point.
    Point { at: ClipPoint, color: Color },
}

/// A complete frame: clear colour, draw list and an optional status line that
/// replaces the scene (e.g. while extraction runs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub clear: Color,
    pub commands: Vec<DrawCommand>,
    pub status: Option<String>,
}

impl Frame {
    /// A frame with no geometry, only a status line.
    #[must_use]
    pub fn status_only(status: impl Into<String>) -> Self {
        Self { clear: Color::BACKGROUND, commands: Vec::new(), status: Some(status.into()) }
    }
}

/// Presentation toggles that do not affect interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderOptions {
    /// Outline trapezoids instead of filling them.
    pub wireframe: bool,
    /// Draw the reference range rings around the pointer.
    pub range_rings: bool,
}

/// Colour used for a trapezoid on `plane`.
#[must_use]
pub fn plane_color(plane: i32) -> Color {
    if plane == 0 { Color::GROUND_PLANE } else { Color::RAISED_PLANE }
}

/// Build the draw list for the current state.
///
/// `pointer` is the world position under the last known pointer; range rings
/// are centred on it and skipped when it is `None`.
#[must_use]
pub fn build_frame(
    camera: &Camera,
    mesh: &MeshView,
    tools: &ToolState,
    options: RenderOptions,
    pointer: Option<WorldPoint>,
) -> Frame {
    let mut commands = Vec::with_capacity(mesh.len() + tools.waypoints().len() + 2);

    let fill = if options.wireframe { Fill::Outline } else { Fill::Solid };
    commands.extend(mesh.regions().iter().map(|t| trapezoid(camera, t, fill)));

    push_waypoints(&mut commands, camera, tools);

    if options.range_rings {
        if let Some(center) = pointer {
            push_range_rings(&mut commands, camera, center);
        }
    }

    if tools.active() == ToolKind::Ruler {
        let ruler = tools.ruler();
        for end in [ruler.start, ruler.end] {
            commands.push(DrawCommand::Point { at: camera.world_to_clip(end), color: Color::RULER });
        }
    }

    Frame { clear: Color::BACKGROUND, commands, status: None }
}

fn trapezoid(camera: &Camera, t: &Trapezoid, fill: Fill) -> DrawCommand {
    DrawCommand::Polygon {
        points: t.corners().iter().map(|&c| camera.world_to_clip(c)).collect(),
        color: plane_color(t.plane),
        fill,
    }
}

fn push_waypoints(commands: &mut Vec<DrawCommand>, camera: &Camera, tools: &ToolState) {
    let points = tools.waypoints().points();
    if points.is_empty() {
        return;
    }

    commands.push(DrawCommand::LineStrip {
        points: points.iter().map(|&p| camera.world_to_clip(p)).collect(),
        color: Color::WAYPOINT_PATH,
    });

    for (i, &p) in points.iter().enumerate() {
        let color = if tools.selected() == Some(i) { Color::WAYPOINT_SELECTED } else { Color::WAYPOINT_MARKER };
        commands.push(DrawCommand::Polygon {
            points: circle(camera, p, WAYPOINT_MARKER_RADIUS, WAYPOINT_MARKER_SEGMENTS, false),
            color,
            fill: Fill::Solid,
        });
    }
}

fn push_range_rings(commands: &mut Vec<DrawCommand>, camera: &Camera, center: WorldPoint) {
    commands.push(DrawCommand::Point { at: camera.world_to_clip(center), color: Color::RANGE_RING });
    for radius in RANGE_RING_RADII {
        commands.push(DrawCommand::LineStrip {
            points: circle(camera, center, radius, RANGE_RING_SEGMENTS, true),
            color: Color::RANGE_RING,
        });
    }
}

/// `segments` points on a world-space circle, projected to clip space.
/// With `closed`, the first point is repeated at the end.
#[allow(clippy::cast_precision_loss)]
fn circle(camera: &Camera, center: WorldPoint, radius: f64, segments: usize, closed: bool) -> Vec<ClipPoint> {
    let step = TAU / segments as f64;
    let count = if closed { segments + 1 } else { segments };
    (0..count)
        .map(|i| {
            let angle = step * (i % segments) as f64;
            camera.world_to_clip(center + WorldPoint::new(angle.cos(), angle.sin()) * radius)
        })
        .collect()
}
