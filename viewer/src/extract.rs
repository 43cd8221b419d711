//! Background archive extraction.
//!
//! Mesh files are produced by an external extractor process. It runs on its
//! own thread so the frame loop keeps pumping events. The only state shared
//! with that thread is a single `AtomicBool` completion flag; the exit status
//! is collected by joining once the flag is set.

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;

use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to start extractor `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("extractor exited with {0}")]
    Failed(ExitStatus),
    #[error("extractor thread panicked")]
    ThreadPanicked,
}

/// A running (or finished) extraction.
#[derive(Debug)]
pub struct Extraction {
    done: Arc<AtomicBool>,
    handle: JoinHandle<Result<(), ExtractError>>,
}

impl Extraction {
    /// Run `command` to completion on a background thread.
    #[must_use]
    pub fn spawn(mut command: Command) -> Self {
        Self::start(move || {
            let program = command.get_program().to_string_lossy().into_owned();
            tracing::info!(%program, "extraction started");
            match command.status() {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(ExtractError::Failed(status)),
                Err(source) => Err(ExtractError::Spawn { program, source }),
            }
        })
    }

    /// Run `job` on a background thread. The completion flag is set however
    /// the job ends, including by panicking.
    pub(crate) fn start<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<(), ExtractError> + Send + 'static,
    {
        let done = Arc::new(AtomicBool::new(false));
        let guard = DoneOnDrop(Arc::clone(&done));
        let handle = std::thread::spawn(move || {
            let _guard = guard;
            job()
        });
        Self { done, handle }
    }

    /// Whether the extractor has exited. Never blocks.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Wait for the extractor and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if the process could not be started, exited
    /// unsuccessfully, or its thread panicked.
    pub fn join(self) -> Result<(), ExtractError> {
        self.handle.join().map_err(|_| ExtractError::ThreadPanicked)?
    }
}

/// Sets the completion flag when dropped, i.e. when the worker closure returns or unwinds.
struct DoneOnDrop(Arc<AtomicBool>);

impl Drop for DoneOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}
