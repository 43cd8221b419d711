//! Shared numeric constants for the viewer crate.

// ── Camera ──────────────────────────────────────────────────────

/// Initial viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;

/// Initial viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 500.0;

/// Initial uniform scale. Map coordinates span tens of thousands of units.
pub const DEFAULT_SCALE: f64 = 0.0001;

/// Scale multiplier for one wheel-up notch.
pub const ZOOM_IN_FACTOR: f64 = 1.25;

/// Scale multiplier for one wheel-down notch.
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

// ── Mesh ────────────────────────────────────────────────────────

/// `max_plane` reported for an empty mesh or one with only low planes.
pub const MIN_MAX_PLANE: i32 = 1;

// ── Waypoints ───────────────────────────────────────────────────

/// Waypoint marker radius in world units.
pub const WAYPOINT_MARKER_RADIUS: f64 = 50.0;

/// Number of segments in a waypoint marker disc.
pub const WAYPOINT_MARKER_SEGMENTS: usize = 60;

// ── Range rings ─────────────────────────────────────────────────

/// Reference ring radii in world units. 300 is "nearby", 1085 spellcast,
/// 2500 spirit and 5000 compass range.
pub const RANGE_RING_RADII: [f64; 6] = [300.0, 322.0, 366.0, 1085.0, 2500.0, 5000.0];

/// Number of segments per range ring.
pub const RANGE_RING_SEGMENTS: usize = 50;

// ── Extraction ──────────────────────────────────────────────────

/// Status line shown while the archive extractor runs.
pub const EXTRACTION_STATUS: &str = "Please wait for extraction...";
