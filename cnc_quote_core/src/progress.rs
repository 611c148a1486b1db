//! Progress reporting abstractions for the quote pipeline
//!
//! The pipeline reports through the [`ProgressObserver`] trait so that it
//! never depends on a particular UI. Every hook has a no-op default; an
//! observer only implements the hooks it cares about.

use crate::quote::Quote;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Phase of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload,
    Analysis,
    Quote,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Upload => "upload",
            Stage::Analysis => "analysis",
            Stage::Quote => "quote",
        };
        f.write_str(name)
    }
}

/// A single progress notification
///
/// `progress` is the percentage for the current unit of work: the whole
/// batch during upload, the current file during analysis. `overall` is the
/// batch-level percentage for the stage and never decreases within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub progress: f64,
    pub overall: f64,
    pub message: String,
    pub current_file: Option<String>,
    pub current_step: Option<String>,
}

impl ProgressEvent {
    pub fn new(stage: Stage, progress: f64, message: impl Into<String>) -> Self {
        let progress = progress.clamp(0.0, 100.0);
        Self {
            stage,
            progress,
            overall: progress,
            message: message.into(),
            current_file: None,
            current_step: None,
        }
    }

    pub fn with_overall(mut self, overall: f64) -> Self {
        self.overall = overall.clamp(0.0, 100.0);
        self
    }

    pub fn with_file(mut self, file: &str) -> Self {
        self.current_file = Some(file.to_string());
        self
    }

    pub fn with_step(mut self, step: &str) -> Self {
        self.current_step = Some(step.to_string());
        self
    }
}

/// Observer for a pipeline run
///
/// `on_start`, `on_complete` and `on_error` fire at most once per run;
/// `on_progress` fires any number of times in between.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self) {}

    fn on_progress(&self, event: ProgressEvent) {
        let _ = event;
    }

    fn on_complete(&self, quote: &Quote) {
        let _ = quote;
    }

    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// Observer that ignores everything
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Arc-wrapped observer for sharing across tasks
#[derive(Clone)]
pub struct SharedObserver {
    inner: Arc<dyn ProgressObserver>,
}

impl SharedObserver {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self { inner: observer }
    }
}

impl ProgressObserver for SharedObserver {
    fn on_start(&self) {
        self.inner.on_start();
    }

    fn on_progress(&self, event: ProgressEvent) {
        self.inner.on_progress(event);
    }

    fn on_complete(&self, quote: &Quote) {
        self.inner.on_complete(quote);
    }

    fn on_error(&self, message: &str) {
        self.inner.on_error(message);
    }
}

type StartFn = Box<dyn Fn() + Send + Sync>;
type ProgressFn = Box<dyn Fn(ProgressEvent) + Send + Sync>;
type CompleteFn = Box<dyn Fn(&Quote) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&str) + Send + Sync>;

/// Observer assembled from up to four optional closures
///
/// ```
/// use cnc_quote_core::progress::Callbacks;
///
/// let callbacks = Callbacks::new()
///     .with_progress(|event| println!("{}: {:.0}%", event.stage, event.progress))
///     .with_error(|message| eprintln!("{message}"));
/// # let _ = callbacks;
/// ```
#[derive(Default)]
pub struct Callbacks {
    start: Option<StartFn>,
    progress: Option<ProgressFn>,
    complete: Option<CompleteFn>,
    error: Option<ErrorFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn with_progress(mut self, f: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn with_complete(mut self, f: impl Fn(&Quote) + Send + Sync + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    pub fn with_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl ProgressObserver for Callbacks {
    fn on_start(&self) {
        if let Some(f) = &self.start {
            f();
        }
    }

    fn on_progress(&self, event: ProgressEvent) {
        if let Some(f) = &self.progress {
            f(event);
        }
    }

    fn on_complete(&self, quote: &Quote) {
        if let Some(f) = &self.complete {
            f(quote);
        }
    }

    fn on_error(&self, message: &str) {
        if let Some(f) = &self.error {
            f(message);
        }
    }
}

/// Everything an observer can be told, as a value
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started,
    Progress(ProgressEvent),
    Completed(Box<Quote>),
    Failed(String),
}

/// Observer that forwards events onto a channel
///
/// The sender is dropped after the terminal event so a receiving loop ends
/// on its own once the run is over.
pub struct ChannelObserver {
    tx: Mutex<Option<mpsc::UnboundedSender<PipelineEvent>>>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Create an observer together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: PipelineEvent) {
        let tx_opt = match self.tx.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if let Some(tx) = tx_opt {
            // Receiver may already be gone
            let _ = tx.send(event);
        }
    }

    fn close(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            *guard = None;
        }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_start(&self) {
        self.send(PipelineEvent::Started);
    }

    fn on_progress(&self, event: ProgressEvent) {
        self.send(PipelineEvent::Progress(event));
    }

    fn on_complete(&self, quote: &Quote) {
        self.send(PipelineEvent::Completed(Box::new(quote.clone())));
        self.close();
    }

    fn on_error(&self, message: &str) {
        self.send(PipelineEvent::Failed(message.to_string()));
        self.close();
    }
}
