//! Per-file analysis records
//!
//! A [`FileAnalysisRecord`] is assembled block by block as the analysis
//! steps run and is never modified once complete.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCounts {
    pub holes: u32,
    pub curves: u32,
    pub threads: u32,
    pub undercuts: u32,
}

/// Synthetic geometry of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFeatures {
    /// cm³
    pub volume: f64,
    /// mm
    pub bounding_box: BoundingBox,
    /// In [0, 1]
    pub complexity: f64,
    pub counts: FeatureCounts,
    pub surface_area: f64,
    /// Grams, assuming aluminium density
    pub estimated_weight: f64,
}

/// One machining operation in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub name: String,
    pub justification: String,
    /// Hours
    pub time: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn from_complexity(complexity: f64) -> Self {
        if complexity > 0.6 {
            Difficulty::High
        } else if complexity > 0.3 {
            Difficulty::Medium
        } else {
            Difficulty::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "low",
            Difficulty::Medium => "medium",
            Difficulty::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingData {
    pub processes: Vec<ProcessStep>,
    pub total_time: f64,
    pub total_cost: f64,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecommendation {
    pub name: String,
    /// g/cm³
    pub density: f64,
    /// Per kilogram
    pub unit_cost: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// In [0, 1]
    pub suitability: f64,
}

/// Rounded cost categories; they sum to the rounded subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material: u64,
    pub machining: u64,
    pub surface_treatment: u64,
    pub quality_control: u64,
    pub shipping: u64,
}

impl CostBreakdown {
    pub fn sum(&self) -> u64 {
        self.material + self.machining + self.surface_treatment + self.quality_control + self.shipping
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Savings {
    pub optimization: u64,
    pub process: u64,
}

impl Savings {
    pub fn sum(&self) -> u64 {
        self.optimization + self.process
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: u64,
    pub total: u64,
    pub market_price: u64,
    pub savings_amount: u64,
    pub savings_percentage: u32,
}

/// Lead time in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub programming: u64,
    pub machining: u64,
    pub finishing: u64,
    pub quality: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEstimation {
    pub breakdown: CostBreakdown,
    pub savings: Savings,
    pub pricing: Pricing,
    pub timeline: Timeline,
}

/// Everything the analysis produced for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysisRecord {
    pub name: String,
    pub size: u64,
    pub extension: String,
    pub features: GeometryFeatures,
    pub manufacturing: ManufacturingData,
    /// Best fit first
    pub materials: Vec<MaterialRecommendation>,
    pub cost: CostEstimation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_thresholds() {
        assert_eq!(Difficulty::from_complexity(0.2), Difficulty::Low);
        assert_eq!(Difficulty::from_complexity(0.3), Difficulty::Low);
        assert_eq!(Difficulty::from_complexity(0.31), Difficulty::Medium);
        assert_eq!(Difficulty::from_complexity(0.6), Difficulty::Medium);
        assert_eq!(Difficulty::from_complexity(0.61), Difficulty::High);
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
