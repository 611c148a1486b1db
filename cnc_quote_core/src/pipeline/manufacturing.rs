//! Manufacturing process analysis stage

use super::{AnalysisContext, AnalysisStage};
use crate::Result;
use crate::record::{Difficulty, GeometryFeatures, ManufacturingData, ProcessStep};
use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;

/// Plans machining operations from the geometry block
#[derive(Debug, Default, Clone, Copy)]
pub struct ManufacturingStage;

#[async_trait]
impl AnalysisStage for ManufacturingStage {
    fn name(&self) -> &str {
        "manufacturing process analysis"
    }

    fn weight(&self) -> f64 {
        0.3
    }

    async fn run(&self, ctx: &mut AnalysisContext, _rng: &mut StdRng) -> Result<()> {
        let features = ctx.require_features(self.name())?;
        let plan = plan_processes(features);
        debug!(
            "{}: {} operations, {:.1} h, difficulty {:?}",
            ctx.file().name(),
            plan.processes.len(),
            plan.total_time,
            plan.difficulty
        );
        ctx.manufacturing = Some(plan);
        Ok(())
    }
}

/// Choose the milling strategy plus any drilling and threading passes
///
/// Deterministic given the features.
pub fn plan_processes(features: &GeometryFeatures) -> ManufacturingData {
    let v = features.volume;
    let c = features.complexity;
    let mut processes = Vec::with_capacity(3);

    let milling = if c > 0.7 {
        ProcessStep {
            name: "5-axis CNC machining".to_string(),
            justification: "Complex geometry needs multi-axis access".to_string(),
            time: v * 0.05 + c * 2.0,
            cost: v * 0.8 + c * 50.0,
        }
    } else if c > 0.4 {
        ProcessStep {
            name: "3-axis CNC machining".to_string(),
            justification: "Moderate complexity suits 3-axis milling".to_string(),
            time: v * 0.03 + c * 1.5,
            cost: v * 0.5 + c * 30.0,
        }
    } else {
        ProcessStep {
            name: "2.5-axis CNC machining".to_string(),
            justification: "Simple features suit 2.5-axis milling".to_string(),
            time: v * 0.02 + c,
            cost: v * 0.3 + c * 20.0,
        }
    };
    processes.push(milling);

    let holes = f64::from(features.counts.holes);
    if features.counts.holes > 10 {
        processes.push(ProcessStep {
            name: "Precision drilling".to_string(),
            justification: "Many holes need a dedicated drilling pass".to_string(),
            time: holes * 0.1,
            cost: holes * 2.0,
        });
    }

    let threads = f64::from(features.counts.threads);
    if features.counts.threads > 0 {
        processes.push(ProcessStep {
            name: "Thread cutting".to_string(),
            justification: "Threaded features need tapping".to_string(),
            time: threads * 0.15,
            cost: threads * 3.0,
        });
    }

    let total_time = processes.iter().map(|p| p.time).sum();
    let total_cost = processes.iter().map(|p| p.cost).sum();

    ManufacturingData {
        processes,
        total_time,
        total_cost,
        difficulty: Difficulty::from_complexity(c),
    }
}
