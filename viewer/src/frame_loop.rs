//! The cooperative, single-threaded frame loop.
//!
//! Each [`tick`] collects a finished extraction, drains one batch of host
//! events into the [`EngineCore`], and, only if something changed, renders
//! exactly one frame and hands it to the host to present. A fresh core starts
//! dirty so the first tick always presents.

#[cfg(test)]
#[path = "frame_loop_test.rs"]
mod frame_loop_test;

use crate::engine::{Action, EngineCore};
use crate::input::InputEvent;
use crate::render::Frame;

/// The windowing side of the loop: an event source and a presentation surface.
pub trait Host {
    type Error;

    /// Drain the events that arrived since the last call.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Show `frame` (swap buffers, paint the canvas, record it...).
    ///
    /// # Errors
    ///
    /// Host-specific presentation failure.
    fn present(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Keep going. `rendered` is whether a frame was presented.
    Continue { rendered: bool },
    /// A quit event was received; nothing was presented.
    Quit,
}

/// Run one iteration of the loop.
///
/// # Errors
///
/// Propagates the host's presentation error.
pub fn tick<H: Host>(core: &mut EngineCore, host: &mut H) -> Result<Tick, H::Error> {
    match core.poll_extraction() {
        Some(Ok(())) => tracing::info!("extraction finished"),
        Some(Err(e)) => tracing::error!(error = %e, "extraction failed"),
        None => {}
    }

    let mut quit = false;
    for event in host.poll_events() {
        quit |= core.handle_event(event).contains(&Action::Quit);
    }
    if quit {
        return Ok(Tick::Quit);
    }

    if !core.take_dirty() {
        return Ok(Tick::Continue { rendered: false });
    }
    host.present(&core.render())?;
    Ok(Tick::Continue { rendered: true })
}

/// Tick until the host sends a quit event. Returns the number of frames presented.
///
/// # Errors
///
/// Propagates the host's presentation error.
pub fn run<H: Host>(core: &mut EngineCore, host: &mut H) -> Result<u64, H::Error> {
    let mut frames = 0;
    loop {
        match tick(core, host)? {
            Tick::Quit => {
                tracing::debug!(frames, "frame loop finished");
                return Ok(frames);
            }
            Tick::Continue { rendered } => frames += u64::from(rendered),
        }
    }
}
