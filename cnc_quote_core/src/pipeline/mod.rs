//! Staged per-file analysis pipeline
//!
//! A file is analysed by running a fixed sequence of weighted stages over a
//! shared [`AnalysisContext`]. Each stage fills in one block of the record
//! and may read blocks produced by earlier stages.

use crate::error::InternalError;
use crate::file::CandidateFile;
use crate::record::{
    CostEstimation, FileAnalysisRecord, GeometryFeatures, ManufacturingData,
    MaterialRecommendation,
};
use crate::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use std::fmt::Debug;

mod costing;
mod geometry;
mod manufacturing;
mod materials;

pub use costing::{CostEstimationStage, PricingConfig, apportion, estimate_cost};
pub use geometry::{GeometryStage, synthesize_features};
pub use manufacturing::{ManufacturingStage, plan_processes};
pub use materials::{
    MaterialCandidate, MaterialStage, Suitability, default_catalog, rank_materials,
};

/// Tolerance when checking that stage weights sum to one
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Core trait for analysis stages
///
/// Stages run strictly in order for each file. A stage that needs the output
/// of an earlier one must fail with [`InternalError::MissingStageOutput`]
/// when that output is absent rather than fabricate it.
#[async_trait]
pub trait AnalysisStage: Send + Sync + Debug {
    /// Human-readable step name, used in progress events
    fn name(&self) -> &str;

    /// Share of the per-file progress this stage accounts for
    fn weight(&self) -> f64;

    /// Run the stage, writing its block into `ctx`
    async fn run(&self, ctx: &mut AnalysisContext, rng: &mut StdRng) -> Result<()>;
}

/// Name and weight of one analysis step
#[derive(Debug, Clone, PartialEq)]
pub struct StepDescriptor {
    pub name: String,
    pub weight: f64,
}

/// Working state for one file while its stages run
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    file: CandidateFile,
    pub features: Option<GeometryFeatures>,
    pub manufacturing: Option<ManufacturingData>,
    pub materials: Option<Vec<MaterialRecommendation>>,
    pub cost: Option<CostEstimation>,
}

impl AnalysisContext {
    pub fn new(file: CandidateFile) -> Self {
        Self {
            file,
            features: None,
            manufacturing: None,
            materials: None,
            cost: None,
        }
    }

    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn require_features(&self, stage: &str) -> Result<&GeometryFeatures> {
        self.features
            .as_ref()
            .ok_or_else(|| InternalError::missing_stage_output(stage, "geometry features").into())
    }

    pub fn require_manufacturing(&self, stage: &str) -> Result<&ManufacturingData> {
        self.manufacturing
            .as_ref()
            .ok_or_else(|| InternalError::missing_stage_output(stage, "manufacturing data").into())
    }

    pub fn require_materials(&self, stage: &str) -> Result<&[MaterialRecommendation]> {
        self.materials
            .as_deref()
            .ok_or_else(|| {
                InternalError::missing_stage_output(stage, "material recommendations").into()
            })
    }

    /// Seal the context into a finished record
    ///
    /// Fails if any block is still missing.
    pub fn finish(self) -> Result<FileAnalysisRecord> {
        let extension = self.file.extension();
        let name = self.file.name().to_string();
        let missing = [
            ("features", self.features.is_none()),
            ("manufacturing", self.manufacturing.is_none()),
            ("materials", self.materials.is_none()),
            ("cost", self.cost.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(block, _)| *block)
        .collect::<Vec<_>>();

        match (self.features, self.manufacturing, self.materials, self.cost) {
            (Some(features), Some(manufacturing), Some(materials), Some(cost)) => {
                Ok(FileAnalysisRecord {
                    name,
                    size: self.file.size(),
                    extension,
                    features,
                    manufacturing,
                    materials,
                    cost,
                })
            }
            _ => Err(InternalError::incomplete_record(&name, &missing.join(", ")).into()),
        }
    }
}

/// The standard four-step analysis sequence
pub fn default_stages(pricing: &PricingConfig) -> Vec<Box<dyn AnalysisStage>> {
    vec![
        Box::new(GeometryStage),
        Box::new(ManufacturingStage),
        Box::new(MaterialStage::default()),
        Box::new(CostEstimationStage::new(pricing.clone())),
    ]
}

/// Descriptors for a stage sequence, in run order
pub fn describe(stages: &[Box<dyn AnalysisStage>]) -> Vec<StepDescriptor> {
    stages
        .iter()
        .map(|stage| StepDescriptor {
            name: stage.name().to_string(),
            weight: stage.weight(),
        })
        .collect()
}

/// Check that a stage sequence is non-empty with non-negative weights
/// summing to one
pub fn check_weights(stages: &[Box<dyn AnalysisStage>]) -> Result<()> {
    if stages.is_empty() {
        return Err(InternalError::assertion("analysis needs at least one stage").into());
    }
    if let Some(stage) = stages.iter().find(|s| !(s.weight() >= 0.0)) {
        return Err(InternalError::assertion(format!(
            "stage '{}' has negative weight {}",
            stage.name(),
            stage.weight()
        ))
        .into());
    }
    let total: f64 = stages.iter().map(|s| s.weight()).sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(
            InternalError::assertion(format!("stage weights sum to {total}, expected 1")).into(),
        );
    }
    Ok(())
}
