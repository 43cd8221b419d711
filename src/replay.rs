//! Drives an [`EngineCore`] through a script with the shared frame loop.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::process::Command;
use std::time::Duration;

use viewer::engine::EngineCore;
use viewer::extract::Extraction;
use viewer::frame_loop::{self, Tick};
use viewer::input::InputEvent;
use viewer::mesh::MeshProvider;

use crate::host::HeadlessHost;
use crate::script::ScriptStep;

/// How often a running extraction is re-checked.
const EXTRACT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub frames: u64,
    /// A scripted quit ended the replay before the last step.
    pub quit_early: bool,
}

pub struct Replay<'a, P: MeshProvider + ?Sized> {
    core: &'a mut EngineCore,
    host: &'a mut HeadlessHost,
    provider: &'a P,
    ticks: u64,
}

impl<'a, P: MeshProvider + ?Sized> Replay<'a, P> {
    pub fn new(core: &'a mut EngineCore, host: &'a mut HeadlessHost, provider: &'a P) -> Self {
        Self { core, host, provider, ticks: 0 }
    }

    /// Run every step, then deliver a final quit.
    pub fn run(mut self, steps: Vec<ScriptStep>) -> ReplaySummary {
        // Present the initial frame before the first step.
        let mut quit = self.tick() == Tick::Quit;

        for (i, step) in steps.into_iter().enumerate() {
            if quit {
                break;
            }
            tracing::debug!(step = i + 1, ?step, "replay step");
            quit = self.step(step) == Tick::Quit;
        }

        let quit_early = quit;
        if !quit {
            self.host.push([InputEvent::Quit]);
            self.tick();
        }
        ReplaySummary { ticks: self.ticks, frames: self.host.frames(), quit_early }
    }

    fn step(&mut self, step: ScriptStep) -> Tick {
        match step {
            ScriptStep::Events { events } => {
                self.host.push(events);
                self.tick()
            }
            ScriptStep::LoadMap { file_id } => {
                // A failed load leaves an empty scene; the core logs it.
                if let Err(e) = self.core.select_map(self.provider, file_id) {
                    tracing::debug!(file_id, error = %e, "continuing without a mesh");
                }
                self.tick()
            }
            ScriptStep::Extract { program, args } => {
                let mut command = Command::new(&program);
                command.args(&args);
                self.core.begin_extraction(Extraction::spawn(command));
                self.drain_extraction()
            }
        }
    }

    fn drain_extraction(&mut self) -> Tick {
        while self.core.is_extracting() {
            if self.tick() == Tick::Quit {
                return Tick::Quit;
            }
            std::thread::sleep(EXTRACT_POLL_INTERVAL);
        }
        // Collects the result and redraws the scene.
        self.tick()
    }

    fn tick(&mut self) -> Tick {
        self.ticks += 1;
        let Ok(tick) = frame_loop::tick(self.core, self.host);
        tick
    }
}
