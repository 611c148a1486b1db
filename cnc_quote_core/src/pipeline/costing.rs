//! Cost estimation stage
//!
//! Currency figures are computed unrounded and rounded once at the end.
//! Category breakdowns use largest-remainder apportionment so the rounded
//! parts always add up to the rounded whole.

use super::{AnalysisContext, AnalysisStage};
use crate::Result;
use crate::error::InternalError;
use crate::quote::CompetitorProfile;
use crate::record::{
    CostBreakdown, CostEstimation, GeometryFeatures, ManufacturingData, MaterialRecommendation,
    Pricing, Savings, Timeline,
};
use async_trait::async_trait;
use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fixed lead-time hours around machining
const PROGRAMMING_HOURS: u64 = 2;
const FINISHING_HOURS: u64 = 1;
const QUALITY_HOURS: u64 = 1;

/// Rates and multipliers behind every quoted figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Cost per unit of surface area
    pub surface_treatment_rate: f64,
    /// Share of material plus machining charged for inspection
    pub quality_control_rate: f64,
    /// Cost per gram shipped
    pub shipping_rate: f64,
    pub minimum_shipping: f64,
    /// Share of machining cost saved by toolpath optimization
    pub optimization_savings_rate: f64,
    /// Share of machining cost saved by the production process
    pub process_savings_rate: f64,
    /// Market price as a multiple of our total
    pub market_multiplier: f64,
    pub competitors: Vec<CompetitorProfile>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            surface_treatment_rate: 0.05,
            quality_control_rate: 0.1,
            shipping_rate: 0.01,
            minimum_shipping: 50.0,
            optimization_savings_rate: 0.3,
            process_savings_rate: 0.2,
            market_multiplier: 2.0,
            competitors: CompetitorProfile::defaults(),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn round_money(value: f64) -> u64 {
    non_negative(value).round() as u64
}

/// Round each value so the results sum to the rounded sum of the inputs
///
/// Floors every value, then hands the leftover units to the values with the
/// largest fractional parts. Earlier values win ties. Negative and
/// non-finite inputs count as zero.
pub fn apportion(values: &[f64]) -> Vec<u64> {
    let values: Vec<f64> = values.iter().copied().map(non_negative).collect();
    let target = round_money(values.iter().sum());
    let mut shares: Vec<u64> = values.iter().map(|v| v.floor() as u64).collect();
    let assigned: u64 = shares.iter().sum();

    let mut order: Vec<usize> = (0..values.len()).collect();
    let fraction = |i: usize| values[i] - values[i].floor();
    order.sort_by(|&a, &b| {
        fraction(b)
            .partial_cmp(&fraction(a))
            .unwrap_or(Ordering::Equal)
    });

    let leftover = target.saturating_sub(assigned) as usize;
    for &i in order.iter().take(leftover) {
        shares[i] += 1;
    }
    shares
}

/// Derive the cost block for one file
///
/// `material` is the top-ranked recommendation.
pub fn estimate_cost(
    features: &GeometryFeatures,
    manufacturing: &ManufacturingData,
    material: &MaterialRecommendation,
    pricing: &PricingConfig,
) -> CostEstimation {
    let material_cost = features.estimated_weight / 1000.0 * material.unit_cost;
    let machining_cost = manufacturing.total_cost;
    let surface_cost = features.surface_area * pricing.surface_treatment_rate;
    let qc_cost = (material_cost + machining_cost) * pricing.quality_control_rate;
    let shipping_cost =
        (features.estimated_weight * pricing.shipping_rate).max(pricing.minimum_shipping);

    let raw = [
        material_cost,
        machining_cost,
        surface_cost,
        qc_cost,
        shipping_cost,
    ];
    let raw_subtotal: f64 = raw.iter().sum();
    let parts = apportion(&raw);
    let breakdown = CostBreakdown {
        material: parts[0],
        machining: parts[1],
        surface_treatment: parts[2],
        quality_control: parts[3],
        shipping: parts[4],
    };

    let optimization = machining_cost * pricing.optimization_savings_rate;
    let process = machining_cost * pricing.process_savings_rate;
    let saved = apportion(&[optimization, process]);
    let savings = Savings {
        optimization: saved[0],
        process: saved[1],
    };

    let subtotal = breakdown.sum();
    let total = round_money(raw_subtotal - optimization - process).min(subtotal);
    let market_price = round_money(total as f64 * pricing.market_multiplier);
    let savings_amount = market_price.saturating_sub(total);
    let savings_percentage = if market_price == 0 {
        0
    } else {
        (savings_amount as f64 / market_price as f64 * 100.0).round() as u32
    };

    let timeline = Timeline {
        programming: PROGRAMMING_HOURS,
        machining: round_money(manufacturing.total_time),
        finishing: FINISHING_HOURS,
        quality: QUALITY_HOURS,
        total: round_money(
            manufacturing.total_time + (PROGRAMMING_HOURS + FINISHING_HOURS + QUALITY_HOURS) as f64,
        ),
    };

    CostEstimation {
        breakdown,
        savings,
        pricing: Pricing {
            subtotal,
            total,
            market_price,
            savings_amount,
            savings_percentage,
        },
        timeline,
    }
}

/// Prices the part from the three earlier blocks
#[derive(Debug, Clone, Default)]
pub struct CostEstimationStage {
    pricing: PricingConfig,
}

impl CostEstimationStage {
    pub fn new(pricing: PricingConfig) -> Self {
        Self { pricing }
    }
}

#[async_trait]
impl AnalysisStage for CostEstimationStage {
    fn name(&self) -> &str {
        "cost estimation"
    }

    fn weight(&self) -> f64 {
        0.2
    }

    async fn run(&self, ctx: &mut AnalysisContext, _rng: &mut StdRng) -> Result<()> {
        let features = ctx.require_features(self.name())?;
        let manufacturing = ctx.require_manufacturing(self.name())?;
        let material = ctx
            .require_materials(self.name())?
            .first()
            .ok_or_else(|| InternalError::stage_failed(self.name(), "no material to price"))?;

        let cost = estimate_cost(features, manufacturing, material, &self.pricing);
        debug!(
            "{}: total {} (market {})",
            ctx.file().name(),
            cost.pricing.total,
            cost.pricing.market_price
        );
        ctx.cost = Some(cost);
        Ok(())
    }
}
