//! Material recommendation stage

use super::{AnalysisContext, AnalysisStage};
use crate::Result;
use crate::record::MaterialRecommendation;
use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a candidate's suitability depends on part complexity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suitability {
    Fixed(f64),
    /// `below` when complexity is under `threshold`, `otherwise` when not
    ComplexityBelow {
        threshold: f64,
        below: f64,
        otherwise: f64,
    },
}

impl Suitability {
    pub fn score(&self, complexity: f64) -> f64 {
        match *self {
            Suitability::Fixed(score) => score,
            Suitability::ComplexityBelow {
                threshold,
                below,
                otherwise,
            } => {
                if complexity < threshold {
                    below
                } else {
                    otherwise
                }
            }
        }
    }
}

/// Catalog entry a recommendation is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCandidate {
    pub name: String,
    pub density: f64,
    pub unit_cost: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub suitability: Suitability,
}

impl MaterialCandidate {
    fn recommend(&self, complexity: f64) -> MaterialRecommendation {
        MaterialRecommendation {
            name: self.name.clone(),
            density: self.density,
            unit_cost: self.unit_cost,
            pros: self.pros.clone(),
            cons: self.cons.clone(),
            suitability: self.suitability.score(complexity),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The three stock materials
pub fn default_catalog() -> Vec<MaterialCandidate> {
    vec![
        MaterialCandidate {
            name: "6061-T6 aluminium".to_string(),
            density: 2.7,
            unit_cost: 18.0,
            pros: strings(&["Lightweight", "Easy to machine", "Corrosion resistant"]),
            cons: strings(&["Moderate strength"]),
            suitability: Suitability::Fixed(0.9),
        },
        MaterialCandidate {
            name: "304 stainless steel".to_string(),
            density: 7.9,
            unit_cost: 25.0,
            pros: strings(&["High strength", "Corrosion resistant", "Food grade"]),
            cons: strings(&["Heavy", "Hard to machine"]),
            suitability: Suitability::ComplexityBelow {
                threshold: 0.5,
                below: 0.8,
                otherwise: 0.6,
            },
        },
        MaterialCandidate {
            name: "Q235 carbon steel".to_string(),
            density: 7.8,
            unit_cost: 12.0,
            pros: strings(&["Low cost", "Easy to weld", "High strength"]),
            cons: strings(&["Rusts easily", "Needs surface treatment"]),
            suitability: Suitability::ComplexityBelow {
                threshold: 0.4,
                below: 0.7,
                otherwise: 0.5,
            },
        },
    ]
}

/// Score every candidate and order them best first
///
/// The sort is stable, so equally suitable candidates keep catalog order.
pub fn rank_materials(
    catalog: &[MaterialCandidate],
    complexity: f64,
) -> Vec<MaterialRecommendation> {
    let mut ranked: Vec<MaterialRecommendation> =
        catalog.iter().map(|c| c.recommend(complexity)).collect();
    ranked.sort_by(|a, b| {
        b.suitability
            .partial_cmp(&a.suitability)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Ranks catalog materials against the part's complexity
#[derive(Debug, Clone)]
pub struct MaterialStage {
    catalog: Vec<MaterialCandidate>,
}

impl MaterialStage {
    pub fn new(catalog: Vec<MaterialCandidate>) -> Self {
        Self { catalog }
    }
}

impl Default for MaterialStage {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

#[async_trait]
impl AnalysisStage for MaterialStage {
    fn name(&self) -> &str {
        "material recommendation"
    }

    fn weight(&self) -> f64 {
        0.2
    }

    async fn run(&self, ctx: &mut AnalysisContext, _rng: &mut StdRng) -> Result<()> {
        let complexity = ctx.require_features(self.name())?.complexity;
        let ranked = rank_materials(&self.catalog, complexity);
        if let Some(top) = ranked.first() {
            debug!("{}: recommending {}", ctx.file().name(), top.name);
        }
        ctx.materials = Some(ranked);
        Ok(())
    }
}
