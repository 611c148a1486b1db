//! Progress rendering for the CLI
//!
//! Turns pipeline events into one indicatif bar per stage. Stages run one
//! after another, so at most one bar is live at a time.

use cnc_quote_core::{PipelineEvent, ProgressEvent, Stage};
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::utils::format_elapsed;

/// How a rendered run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed { quote_id: String },
    Failed(String),
}

/// Render events until the channel closes
pub async fn render_progress(
    mut rx: mpsc::UnboundedReceiver<PipelineEvent>,
) -> Option<RenderOutcome> {
    let mut renderer = ProgressRenderer::new();

    while let Some(event) = rx.recv().await {
        renderer.handle_event(event);
    }

    renderer.finish()
}

pub struct ProgressRenderer {
    bars: Vec<(Stage, ProgressBar)>,
    start_time: Instant,
    outcome: Option<RenderOutcome>,
    hidden: bool,
    events: usize,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            start_time: Instant::now(),
            outcome: None,
            hidden: false,
            events: 0,
        }
    }

    /// Renderer that tracks state without drawing
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::new()
        }
    }

    pub fn handle_event(&mut self, event: PipelineEvent) {
        self.events += 1;
        match event {
            PipelineEvent::Started => {
                self.start_time = Instant::now();
                if !self.hidden {
                    eprintln!("{} Preparing quote", "→".green());
                }
            }
            PipelineEvent::Progress(progress) => self.update_stage(progress),
            PipelineEvent::Completed(quote) => {
                self.finish_bars(true);
                self.outcome = Some(RenderOutcome::Completed { quote_id: quote.id });
            }
            PipelineEvent::Failed(message) => {
                self.finish_bars(false);
                self.outcome = Some(RenderOutcome::Failed(message));
            }
        }
    }

    /// Number of events handled so far
    pub fn events(&self) -> usize {
        self.events
    }

    /// Stages that have had a bar, in the order they appeared
    pub fn stages(&self) -> Vec<Stage> {
        self.bars.iter().map(|(stage, _)| *stage).collect()
    }

    /// Current bar position for a stage, 0..=100
    pub fn position(&self, stage: Stage) -> Option<u64> {
        self.bar(stage).map(ProgressBar::position)
    }

    fn bar(&self, stage: Stage) -> Option<&ProgressBar> {
        self.bars
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, bar)| bar)
    }

    fn update_stage(&mut self, event: ProgressEvent) {
        if self.bar(event.stage).is_none() {
            // The previous stage is done once the next one reports
            if let Some((_, previous)) = self.bars.last()
                && !previous.is_finished()
            {
                previous.finish();
            }
            let bar = self.create_bar(event.stage);
            self.bars.push((event.stage, bar));
        }

        let Some(bar) = self.bar(event.stage) else {
            return;
        };
        bar.set_position(event.overall.round() as u64);
        bar.set_message(describe(&event));
    }

    fn create_bar(&self, stage: Stage) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(Some(100), self.draw_target());

        let (label, style) = match stage {
            Stage::Upload => ("Uploading", "{prefix:>10.bold} [{bar:40.cyan/blue}] {percent:>3}% {msg}"),
            Stage::Analysis => ("Analyzing", "{prefix:>10.bold} [{bar:40.green/blue}] {percent:>3}% {msg}"),
            Stage::Quote => ("Quoting", "{prefix:>10.bold} {spinner:.cyan} {msg}"),
        };
        bar.set_style(
            ProgressStyle::with_template(style)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_prefix(label);
        if stage == Stage::Quote {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar
    }

    fn draw_target(&self) -> ProgressDrawTarget {
        if self.hidden {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        }
    }

    fn finish_bars(&mut self, success: bool) {
        for (_, bar) in &self.bars {
            if bar.is_finished() {
                continue;
            }
            if success {
                bar.finish();
            } else {
                bar.abandon();
            }
        }
    }

    /// Print the closing status line and report the outcome
    pub fn finish(self) -> Option<RenderOutcome> {
        if !self.hidden {
            let elapsed = format_elapsed(self.start_time.elapsed());
            match &self.outcome {
                Some(RenderOutcome::Completed { quote_id }) => {
                    eprintln!("{} Quote {} ready in {}", "✓".green(), quote_id.bold(), elapsed);
                }
                Some(RenderOutcome::Failed(message)) => {
                    eprintln!("{} {}", "✗".red(), message);
                }
                None => {}
            }
        }
        self.outcome
    }
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(event: &ProgressEvent) -> String {
    match (&event.current_file, &event.current_step) {
        (Some(file), Some(step)) => format!("{} · {}", file.cyan(), step),
        _ => event.message.clone(),
    }
}
