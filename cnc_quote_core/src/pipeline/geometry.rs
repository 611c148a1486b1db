//! Geometry feature recognition stage

use super::{AnalysisContext, AnalysisStage};
use crate::Result;
use crate::record::{BoundingBox, FeatureCounts, GeometryFeatures};
use async_trait::async_trait;
use log::debug;
use rand::Rng;
use rand::rngs::StdRng;

/// Aluminium density in g/cm³, used for the weight estimate
const REFERENCE_DENSITY: f64 = 2.7;

/// Synthesizes part geometry
///
/// No CAD content is parsed; every figure is drawn from the RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeometryStage;

#[async_trait]
impl AnalysisStage for GeometryStage {
    fn name(&self) -> &str {
        "geometry feature recognition"
    }

    fn weight(&self) -> f64 {
        0.3
    }

    async fn run(&self, ctx: &mut AnalysisContext, rng: &mut StdRng) -> Result<()> {
        let features = synthesize_features(rng);
        debug!(
            "{}: volume {:.1} cm³, complexity {:.2}",
            ctx.file().name(),
            features.volume,
            features.complexity
        );
        ctx.features = Some(features);
        Ok(())
    }
}

/// Draw one synthetic geometry block
pub fn synthesize_features(rng: &mut StdRng) -> GeometryFeatures {
    let volume = rng.random_range(100.0..1100.0);
    let complexity = rng.random_range(0.2..1.0);

    let bounding_box = BoundingBox {
        length: rng.random_range(50.0..250.0),
        width: rng.random_range(30.0..180.0),
        height: rng.random_range(20.0..120.0),
    };

    let counts = FeatureCounts {
        holes: rng.random_range(0..20),
        curves: rng.random_range(0..15),
        threads: rng.random_range(0..8),
        undercuts: rng.random_range(0..5),
    };

    GeometryFeatures {
        volume,
        bounding_box,
        complexity,
        counts,
        surface_area: volume * (4.0 + complexity * 2.0),
        estimated_weight: volume * REFERENCE_DENSITY,
    }
}
