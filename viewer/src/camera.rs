//! Pan/zoom camera and the three coordinate spaces it converts between.
//!
//! Screen space is window pixels with the origin at the top-left and Y growing
//! downward. World space is mesh units with Y growing upward. Clip space is
//! normalized device coordinates in `[-1, 1]` and is what the renderer emits.
//!
//! The camera is the only place that converts between spaces. The renderer goes
//! world → clip through [`Camera::world_to_clip`]; input goes screen → world
//! through [`Camera::screen_to_world`]. Both are built from the same fields so
//! a click always lands where the geometry was drawn.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCALE, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

macro_rules! point_ops {
    ($ty:ident) => {
        impl $ty {
            #[must_use]
            pub const fn new(x: f64, y: f64) -> Self {
                Self { x, y }
            }

            /// Euclidean distance to `other`.
            #[must_use]
            pub fn distance(self, other: Self) -> f64 {
                (self.x - other.x).hypot(self.y - other.y)
            }
        }

        impl Add for $ty {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::new(self.x + rhs.x, self.y + rhs.y)
            }
        }

        impl AddAssign for $ty {
            fn add_assign(&mut self, rhs: Self) {
                self.x += rhs.x;
                self.y += rhs.y;
            }
        }

        impl Sub for $ty {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::new(self.x - rhs.x, self.y - rhs.y)
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;

            fn mul(self, rhs: f64) -> Self {
                Self::new(self.x * rhs, self.y * rhs)
            }
        }
    };
}

/// A point or delta in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// A point or offset in mesh (world) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

point_ops!(ScreenPoint);
point_ops!(WorldPoint);

/// A point in normalized device coordinates. Only the camera produces these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClipPoint {
    pub x: f64,
    pub y: f64,
}

/// Mouse-wheel zoom direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a vertical wheel delta to a direction. Positive is wheel-up (zoom in).
    /// A zero delta (pure horizontal scroll) yields `None`.
    #[must_use]
    pub fn from_wheel(dy: f64) -> Option<Self> {
        if dy > 0.0 {
            Some(Self::In)
        } else if dy < 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Camera state: uniform scale, world-space translation and the viewport it
/// projects onto.
///
/// `scale` is never clamped; `scale > 0` holds because it starts positive and
/// is only ever multiplied by positive factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    scale: f64,
    translate: WorldPoint,
    width: f64,
    height: f64,
    aspect: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_SCALE)
    }
}

impl Camera {
    /// Create a camera for a `width` × `height` pixel viewport.
    ///
    /// `height` must be positive; see [`Camera::resize`].
    #[must_use]
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        debug_assert!(scale > 0.0, "camera scale must be positive");
        let mut camera = Self { scale, translate: WorldPoint::default(), width: 0.0, height: 0.0, aspect: 1.0 };
        camera.resize(width, height);
        camera
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn translate(&self) -> WorldPoint {
        self.translate
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// `width / height`, recomputed on every resize.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Set the translation directly, e.g. to centre a spawn point.
    pub fn set_translate(&mut self, translate: WorldPoint) {
        self.translate = translate;
    }

    /// Update the viewport size and recompute the aspect ratio.
    ///
    /// Precondition: `height > 0`. A zero height is a host bug; the frame loop
    /// filters such events before they reach the camera.
    pub fn resize(&mut self, width: f64, height: f64) {
        debug_assert!(height > 0.0, "viewport height must be positive");
        self.width = width;
        self.height = height;
        self.aspect = width / height;
    }

    /// Multiply the scale by the zoom factor for `direction`.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.scale *= match direction {
            ZoomDirection::In => ZOOM_IN_FACTOR,
            ZoomDirection::Out => ZOOM_OUT_FACTOR,
        };
    }

    /// Pan by a screen-space pixel delta so the world point under the pointer
    /// follows the pointer.
    pub fn pan(&mut self, delta: ScreenPoint) {
        self.translate += self.screen_delta_to_world(delta);
    }

    /// Convert a pixel delta to a world-space offset. Screen Y is flipped.
    #[must_use]
    pub fn screen_delta_to_world(&self, delta: ScreenPoint) -> WorldPoint {
        let x = delta.x / self.width;
        let y = -delta.y / self.height / self.aspect;
        WorldPoint::new(x, y) * (2.0 / self.scale)
    }

    /// Convert a screen-space point (pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> WorldPoint {
        let x = screen.x / self.width - 0.5;
        let y = (screen.y / -self.height + 0.5) / self.aspect;
        WorldPoint::new(x, y) * (2.0 / self.scale) - self.translate
    }

    /// Project a world point to clip space: translate, then scale, then aspect.
    #[must_use]
    pub fn world_to_clip(&self, world: WorldPoint) -> ClipPoint {
        let p = (world + self.translate) * self.scale;
        ClipPoint { x: p.x, y: p.y * self.aspect }
    }

    /// Map clip space onto the viewport in pixels.
    #[must_use]
    pub fn clip_to_screen(&self, clip: ClipPoint) -> ScreenPoint {
        clip_to_pixels(clip, self.width, self.height)
    }

    /// Convert a world point to screen pixels. Inverse of [`Camera::screen_to_world`].
    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint) -> ScreenPoint {
        self.clip_to_screen(self.world_to_clip(world))
    }
}

/// Map a clip-space point onto a `width` × `height` pixel surface.
#[must_use]
pub fn clip_to_pixels(clip: ClipPoint, width: f64, height: f64) -> ScreenPoint {
    ScreenPoint::new((clip.x + 1.0) * 0.5 * width, (1.0 - clip.y) * 0.5 * height)
}
