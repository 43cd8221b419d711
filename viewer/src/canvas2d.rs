//! Canvas 2D backend: paints a [`Frame`] onto a browser canvas.
//!
//! Painting is split in two. [`plan`] maps the clip-space draw list onto
//! canvas pixels and resolves colours, producing plain [`PaintOp`]s. [`paint`]
//! replays those ops on a [`CanvasRenderingContext2d`], and is the only place
//! that touches the browser API. Neither reads nor mutates viewer state.

#[cfg(test)]
#[path = "canvas2d_test.rs"]
mod canvas2d_test;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{ClipPoint, ScreenPoint, clip_to_pixels};
use crate::render::{DrawCommand, Fill, Frame};

/// Side length of a point primitive, in pixels.
pub const POINT_SIZE_PX: f64 = 3.0;

const STATUS_FONT: &str = "16px sans-serif";
const STATUS_COLOR: &str = "#fff";

/// One canvas operation, in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Fill the whole canvas.
    Clear { css: String },
    /// Fill the closed path through `points`.
    Fill { points: Vec<ScreenPoint>, css: String },
    /// Stroke the path through `points`, closing it if `closed`.
    Stroke { points: Vec<ScreenPoint>, closed: bool, css: String },
    /// Axis-aligned square centred on `center`.
    Square { center: ScreenPoint, size: f64, css: String },
    /// Text centred on the canvas.
    Status { text: String },
}

/// Translate `frame` into canvas operations for a `width` × `height` canvas.
#[must_use]
pub fn plan(frame: &Frame, width: f64, height: f64) -> Vec<PaintOp> {
    let to_px = |points: &[ClipPoint]| -> Vec<ScreenPoint> {
        points.iter().map(|&c| clip_to_pixels(c, width, height)).collect()
    };

    let mut ops = Vec::with_capacity(frame.commands.len() + 2);
    ops.push(PaintOp::Clear { css: frame.clear.to_css() });
    for command in &frame.commands {
        ops.push(match command {
            DrawCommand::Polygon { points, color, fill: Fill::Solid } => {
                PaintOp::Fill { points: to_px(points), css: color.to_css() }
            }
            DrawCommand::Polygon { points, color, fill: Fill::Outline } => {
                PaintOp::Stroke { points: to_px(points), closed: true, css: color.to_css() }
            }
            DrawCommand::LineStrip { points, color } => {
                PaintOp::Stroke { points: to_px(points), closed: false, css: color.to_css() }
            }
            DrawCommand::Point { at, color } => PaintOp::Square {
                center: clip_to_pixels(*at, width, height),
                size: POINT_SIZE_PX,
                css: color.to_css(),
            },
        });
    }
    if let Some(text) = &frame.status {
        ops.push(PaintOp::Status { text: text.clone() });
    }
    ops
}

/// Draw `frame` onto a `width` × `height` pixel canvas.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn paint(ctx: &CanvasRenderingContext2d, frame: &Frame, width: f64, height: f64) -> Result<(), JsValue> {
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.set_line_width(1.0);

    for op in plan(frame, width, height) {
        match op {
            PaintOp::Clear { css } => {
                ctx.set_fill_style_str(&css);
                ctx.fill_rect(0.0, 0.0, width, height);
            }
            PaintOp::Fill { points, css } => {
                trace(ctx, &points);
                ctx.close_path();
                ctx.set_fill_style_str(&css);
                ctx.fill();
            }
            PaintOp::Stroke { points, closed, css } => {
                trace(ctx, &points);
                if closed {
                    ctx.close_path();
                }
                ctx.set_stroke_style_str(&css);
                ctx.stroke();
            }
            PaintOp::Square { center, size, css } => {
                ctx.set_fill_style_str(&css);
                ctx.fill_rect(center.x - size * 0.5, center.y - size * 0.5, size, size);
            }
            PaintOp::Status { text } => {
                ctx.set_fill_style_str(STATUS_COLOR);
                ctx.set_font(STATUS_FONT);
                let metrics = ctx.measure_text(&text)?;
                ctx.fill_text(&text, (width - metrics.width()) * 0.5, height * 0.5)?;
            }
        }
    }
    Ok(())
}

/// Start a new path through `points`.
fn trace(ctx: &CanvasRenderingContext2d, points: &[ScreenPoint]) {
    ctx.begin_path();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            ctx.move_to(p.x, p.y);
        } else {
            ctx.line_to(p.x, p.y);
        }
    }
}
