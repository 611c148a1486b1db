//! Per-file analysis driver

use crate::Result;
use crate::file::CandidateFile;
use crate::pacing::{ANALYSIS_STEP_DELAY, Pacer};
use crate::pipeline::{AnalysisContext, AnalysisStage};
use crate::progress::{ProgressEvent, ProgressObserver, Stage};
use crate::record::FileAnalysisRecord;
use log::{debug, warn};
use rand::rngs::StdRng;

/// Runs the stage sequence over one file at a time
pub struct FileAnalyzer<'a> {
    stages: &'a [Box<dyn AnalysisStage>],
    pacer: &'a Pacer,
}

impl<'a> FileAnalyzer<'a> {
    pub fn new(stages: &'a [Box<dyn AnalysisStage>], pacer: &'a Pacer) -> Self {
        Self { stages, pacer }
    }

    /// Analyse file `index` of a batch of `count`
    ///
    /// Emits one event per stage, before the stage runs, carrying the
    /// cumulative weight so far. The first stage fault aborts the file.
    pub async fn analyze(
        &self,
        file: &CandidateFile,
        index: usize,
        count: usize,
        rng: &mut StdRng,
        observer: &dyn ProgressObserver,
    ) -> Result<FileAnalysisRecord> {
        let mut ctx = AnalysisContext::new(file.clone());
        let mut cumulative = 0.0;
        let last = self.stages.len().saturating_sub(1);

        for (i, stage) in self.stages.iter().enumerate() {
            self.pacer.pause(rng, ANALYSIS_STEP_DELAY).await;

            cumulative += stage.weight();
            // Weights sum to one within float error; pin the final step
            let progress = if i == last { 100.0 } else { cumulative * 100.0 };
            let overall = (index as f64 + progress / 100.0) / count.max(1) as f64 * 100.0;
            observer.on_progress(
                ProgressEvent::new(Stage::Analysis, progress, stage.name())
                    .with_overall(overall)
                    .with_file(file.name())
                    .with_step(stage.name()),
            );

            debug!("{}: running {}", file.name(), stage.name());
            if let Err(e) = stage.run(&mut ctx, rng).await {
                warn!("{}: {} failed: {}", file.name(), stage.name(), e);
                return Err(e);
            }
        }

        ctx.finish()
    }
}
