//! Observer that records every notification

use cnc_quote_core::progress::{ProgressEvent, ProgressObserver, Stage};
use cnc_quote_core::quote::Quote;
use std::sync::Mutex;

/// One recorded notification
#[derive(Debug, Clone)]
pub enum Recorded {
    Start,
    Progress(ProgressEvent),
    Complete(Box<Quote>),
    Error(String),
}

/// Records hooks in arrival order for later assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    log: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: Recorded) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }

    /// Everything recorded so far
    pub fn entries(&self) -> Vec<Recorded> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, Recorded::Start))
    }

    pub fn completions(&self) -> usize {
        self.count(|e| matches!(e, Recorded::Complete(_)))
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Progress events for one stage, in order
    pub fn progress(&self, stage: Stage) -> Vec<ProgressEvent> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Progress(event) if event.stage == stage => Some(event),
                _ => None,
            })
            .collect()
    }

    /// The quote passed to `on_complete`, if any
    pub fn quote(&self) -> Option<Quote> {
        self.entries().into_iter().find_map(|e| match e {
            Recorded::Complete(quote) => Some(*quote),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&Recorded) -> bool) -> usize {
        self.log
            .lock()
            .map(|l| l.iter().filter(|e| predicate(e)).count())
            .unwrap_or(0)
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_start(&self) {
        self.push(Recorded::Start);
    }

    fn on_progress(&self, event: ProgressEvent) {
        self.push(Recorded::Progress(event));
    }

    fn on_complete(&self, quote: &Quote) {
        self.push(Recorded::Complete(Box::new(quote.clone())));
    }

    fn on_error(&self, message: &str) {
        self.push(Recorded::Error(message.to_string()));
    }
}
