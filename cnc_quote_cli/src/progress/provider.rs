//! Wiring between the core observer and the terminal renderer

use cnc_quote_core::{ChannelObserver, NullObserver, ProgressObserver};
use tokio::task::JoinHandle;

use super::renderer::{RenderOutcome, render_progress};

/// Observer handed to the pipeline plus the task drawing its events
pub struct ProgressInfrastructure {
    observer: Box<dyn ProgressObserver>,
    renderer: Option<JoinHandle<Option<RenderOutcome>>>,
}

impl ProgressInfrastructure {
    pub fn observer(&self) -> &dyn ProgressObserver {
        self.observer.as_ref()
    }

    pub fn is_rendering(&self) -> bool {
        self.renderer.is_some()
    }

    /// Wait for the renderer to drain
    ///
    /// The channel closes after the terminal event, so this returns once
    /// the run has completed or failed.
    pub async fn finish(self) -> Option<RenderOutcome> {
        drop(self.observer);
        match self.renderer {
            Some(handle) => handle.await.ok().flatten(),
            None => None,
        }
    }
}

/// Build the observer for one run
///
/// With `show` unset the pipeline reports into a no-op observer and nothing
/// is spawned.
pub fn create_progress_infrastructure(show: bool) -> ProgressInfrastructure {
    if !show {
        return ProgressInfrastructure {
            observer: Box::new(NullObserver),
            renderer: None,
        };
    }

    let (observer, rx) = ChannelObserver::channel();
    ProgressInfrastructure {
        observer: Box::new(observer),
        renderer: Some(tokio::spawn(render_progress(rx))),
    }
}
