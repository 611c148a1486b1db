//! The quote pipeline entry point
//!
//! [`QuoteProcessor`] wraps one run in a single guarded envelope: every
//! fault, whether raised during validation or processing, is reported to
//! the observer exactly once through `on_error` and returned to the caller.

use crate::analyzer::FileAnalyzer;
use crate::file::CandidateFile;
use crate::pacing::Pacer;
use crate::pipeline::{self, AnalysisStage, StepDescriptor};
use crate::progress::ProgressObserver;
use crate::quote::{Quote, QuoteAssembler};
use crate::upload::UploadSimulator;
use crate::validation::{BatchValidation, validate_batch};
use crate::{QuoteConfig, Result};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

/// Runs batches through validation, upload, analysis and quoting
pub struct QuoteProcessor {
    config: QuoteConfig,
    stages: Vec<Box<dyn AnalysisStage>>,
    pacer: Pacer,
    rng: StdRng,
}

impl QuoteProcessor {
    /// Create a processor with the standard analysis stages
    ///
    /// Seeds the RNG from `config.seed`, or from the OS when unset.
    pub fn new(config: QuoteConfig) -> Result<Self> {
        config.limits.check()?;
        let stages = pipeline::default_stages(&config.pricing);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            pacer: Pacer::new(config.time_unit()),
            stages,
            rng,
            config,
        })
    }

    /// Replace the analysis stages
    pub fn with_stages(mut self, stages: Vec<Box<dyn AnalysisStage>>) -> Result<Self> {
        pipeline::check_weights(&stages)?;
        self.stages = stages;
        Ok(self)
    }

    /// Reseed the RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    pub fn steps(&self) -> Vec<StepDescriptor> {
        pipeline::describe(&self.stages)
    }

    /// Validate a batch without running anything
    pub fn validate(&self, files: &[CandidateFile]) -> BatchValidation {
        validate_batch(files, &self.config.limits)
    }

    /// Run a batch end to end
    ///
    /// A rejected batch never reaches `on_start`.
    pub async fn process(
        &mut self,
        files: &[CandidateFile],
        observer: &dyn ProgressObserver,
    ) -> Result<Quote> {
        let validation = self.validate(files);
        for warning in &validation.warnings {
            warn!("{warning}");
        }
        let accepted = match validation.into_accepted(&self.config.error_delimiter) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Batch rejected: {e}");
                observer.on_error(&e.to_string());
                return Err(e);
            }
        };

        observer.on_start();
        let started = Instant::now();

        match self.run(&accepted, observer).await {
            Ok(quote) => {
                info!(
                    "Quote {} ready: {} files, total {} in {:?}",
                    quote.id,
                    quote.analysis.summary.total_files,
                    quote.analysis.summary.total_cost,
                    started.elapsed()
                );
                observer.on_complete(&quote);
                Ok(quote)
            }
            Err(e) => {
                warn!("Quote pipeline failed: {e}");
                observer.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run(&mut self, files: &[CandidateFile], observer: &dyn ProgressObserver) -> Result<Quote> {
        let Self {
            config,
            stages,
            pacer,
            rng,
        } = self;

        let chunks = UploadSimulator::new(pacer).upload(files, rng, observer).await;
        debug!("Upload finished after {chunks} chunks");

        let analyzer = FileAnalyzer::new(stages, pacer);
        let mut records = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            records.push(analyzer.analyze(file, index, files.len(), rng, observer).await?);
        }

        let quote = QuoteAssembler::new(pacer, &config.pricing)
            .assemble(records, observer)
            .await;
        Ok(quote)
    }
}

/// Run one batch with a fresh processor
pub async fn process_batch(
    files: &[CandidateFile],
    config: QuoteConfig,
    observer: &dyn ProgressObserver,
) -> Result<Quote> {
    let mut processor = match QuoteProcessor::new(config) {
        Ok(processor) => processor,
        Err(e) => {
            observer.on_error(&e.to_string());
            return Err(e);
        }
    };
    processor.process(files, observer).await
}
