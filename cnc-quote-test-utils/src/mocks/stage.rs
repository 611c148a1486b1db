//! Mock analysis stages

use async_trait::async_trait;
use cnc_quote_core::Result;
use cnc_quote_core::error::InternalError;
use cnc_quote_core::pipeline::{AnalysisContext, AnalysisStage};
use rand::rngs::StdRng;

/// Stage that always fails
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    weight: f64,
    message: String,
}

impl FailingStage {
    pub fn new(name: &str, weight: f64, message: &str) -> Self {
        Self {
            name: name.to_string(),
            weight,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl AnalysisStage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn run(&self, _ctx: &mut AnalysisContext, _rng: &mut StdRng) -> Result<()> {
        Err(InternalError::stage_failed(&self.name, &self.message).into())
    }
}

/// Stage that succeeds without writing anything
#[derive(Debug)]
pub struct SilentStage {
    name: String,
    weight: f64,
}

impl SilentStage {
    pub fn new(name: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
        }
    }
}

#[async_trait]
impl AnalysisStage for SilentStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    async fn run(&self, _ctx: &mut AnalysisContext, _rng: &mut StdRng) -> Result<()> {
        Ok(())
    }
}
