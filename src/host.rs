//! Headless [`Host`]: scripted events in, recorded frames out.

use std::convert::Infallible;

use viewer::frame_loop::Host;
use viewer::input::InputEvent;
use viewer::render::Frame;

#[derive(Debug, Default)]
pub struct HeadlessHost {
    pending: Vec<InputEvent>,
    last_frame: Option<Frame>,
    frames: u64,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue events for the next tick.
    pub fn push(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.pending.extend(events);
    }

    /// Most recently presented frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Host for HeadlessHost {
    type Error = Infallible;

    fn poll_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    fn present(&mut self, frame: &Frame) -> Result<(), Infallible> {
        self.frames += 1;
        tracing::trace!(frame = self.frames, commands = frame.commands.len(), status = ?frame.status, "frame presented");
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
