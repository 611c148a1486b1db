//! Quote assembly
//!
//! Combines the finished per-file records into a batch summary and attaches
//! recommendations, a competitor comparison and the fixed service terms.

use crate::pacing::{Pacer, QUOTE_DELAY};
use crate::pipeline::PricingConfig;
use crate::progress::{ProgressEvent, ProgressObserver, Stage};
use crate::record::FileAnalysisRecord;
use chrono::{DateTime, Utc};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mean complexity above which simplification is suggested
const SIMPLIFY_COMPLEXITY: f64 = 0.7;
/// Part volume (cm³) above which a lighter material is suggested
const LIGHTWEIGHT_VOLUME: f64 = 500.0;
/// File count above which batch production is suggested
const BATCH_FILE_COUNT: usize = 3;

/// A finished quote, owned by the caller once returned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub analysis: QuoteAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub competitor_comparison: Vec<CompetitorQuote>,
    pub quality_promises: Vec<QualityPromise>,
    pub next_steps: Vec<NextStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAnalysis {
    /// In batch order
    pub files: Vec<FileAnalysisRecord>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub total_volume: u64,
    pub total_cost: u64,
    pub total_market_price: u64,
    pub total_savings: u64,
    /// Rounded to two decimals
    pub avg_complexity: f64,
    /// Hours, the slowest file's lead time
    pub estimated_delivery: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Manufacturing,
    Material,
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: String,
}

/// A competitor whose price is derived from ours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub name: String,
    pub logo: String,
    pub multiplier: f64,
    pub delivery: String,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
}

impl CompetitorProfile {
    fn new(
        name: &str,
        multiplier: f64,
        delivery: &str,
        advantages: &[&str],
        disadvantages: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            logo: format!("/icons/competitors/{}.png", name.to_lowercase()),
            multiplier,
            delivery: delivery.to_string(),
            advantages: advantages.iter().map(|s| s.to_string()).collect(),
            disadvantages: disadvantages.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "Xometry",
                2.2,
                "7-14 days",
                &["Well known"],
                &["Expensive", "Long lead times", "Slow support"],
            ),
            Self::new(
                "Protolabs",
                1.8,
                "3-5 days",
                &["Fast prototyping"],
                &["Higher prices", "Costly at volume"],
            ),
            Self::new(
                "Fictiv",
                1.6,
                "5-8 days",
                &["Platform based"],
                &["Inconsistent quality", "Slow communication"],
            ),
        ]
    }

    pub fn quote(&self, our_price: u64) -> CompetitorQuote {
        CompetitorQuote {
            name: self.name.clone(),
            logo: self.logo.clone(),
            price: (our_price as f64 * self.multiplier).max(0.0).round() as u64,
            delivery: self.delivery.clone(),
            advantages: self.advantages.clone(),
            disadvantages: self.disadvantages.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorQuote {
    pub name: String,
    pub logo: String,
    pub price: u64,
    pub delivery: String,
    pub advantages: Vec<String>,
    pub disadvantages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityPromise {
    pub title: String,
    pub detail: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    pub action: String,
}

/// Aggregate the per-file records
pub fn summarize(files: &[FileAnalysisRecord]) -> BatchSummary {
    let total_volume: f64 = files.iter().map(|f| f.features.volume).sum();
    let total_cost: u64 = files.iter().map(|f| f.cost.pricing.total).sum();
    let total_market_price: u64 = files.iter().map(|f| f.cost.pricing.market_price).sum();
    let avg_complexity = if files.is_empty() {
        0.0
    } else {
        files.iter().map(|f| f.features.complexity).sum::<f64>() / files.len() as f64
    };

    BatchSummary {
        total_files: files.len(),
        total_volume: total_volume.round() as u64,
        total_cost,
        total_market_price,
        total_savings: total_market_price.saturating_sub(total_cost),
        avg_complexity: (avg_complexity * 100.0).round() / 100.0,
        estimated_delivery: files
            .iter()
            .map(|f| f.cost.timeline.total)
            .max()
            .unwrap_or(0),
    }
}

/// Suggestions triggered by the batch; each rule applies independently
pub fn recommend(analysis: &QuoteAnalysis) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if analysis.summary.avg_complexity > SIMPLIFY_COMPLEXITY {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Manufacturing,
            title: "Simplify complex features".to_string(),
            description: "Simplifying some features lowers machining difficulty and cost"
                .to_string(),
            impact: "Saves 15-25% of manufacturing cost".to_string(),
        });
    }

    if analysis
        .files
        .iter()
        .any(|f| f.features.volume > LIGHTWEIGHT_VOLUME)
    {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Material,
            title: "Choose a lighter material".to_string(),
            description: "6061-T6 aluminium can replace steel for these parts".to_string(),
            impact: "65% lighter with lower shipping cost".to_string(),
        });
    }

    if analysis.files.len() > BATCH_FILE_COUNT {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Batch,
            title: "Batch production".to_string(),
            description: "Parts can share fixtures to lower the unit cost".to_string(),
            impact: "5-15% batch discount".to_string(),
        });
    }

    recommendations
}

pub fn compare_competitors(our_price: u64, profiles: &[CompetitorProfile]) -> Vec<CompetitorQuote> {
    profiles.iter().map(|p| p.quote(our_price)).collect()
}

pub fn quality_promises() -> Vec<QualityPromise> {
    [
        (
            "Precision guarantee",
            "±0.05 mm machining accuracy, 100% remake if out of tolerance",
            "precision",
        ),
        (
            "Delivery commitment",
            "24-hour express delivery, 10% compensation for delays",
            "delivery",
        ),
        (
            "Quality tracking",
            "Automated inspection throughout with live quality reports",
            "quality",
        ),
        (
            "After-sales service",
            "Round-the-clock technical support with a dedicated contact",
            "service",
        ),
    ]
    .into_iter()
    .map(|(title, detail, icon)| QualityPromise {
        title: title.to_string(),
        detail: detail.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

pub fn next_steps() -> Vec<NextStep> {
    [
        (
            "Confirm quote",
            "Accept this quote with the confirm button",
            "confirm-quote",
        ),
        (
            "Provide requirements",
            "Fill in machining and surface finish requirements",
            "fill-requirements",
        ),
        (
            "Pay deposit",
            "A 30% deposit starts production",
            "payment",
        ),
        (
            "Track production",
            "Follow production progress and quality reports live",
            "track-production",
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((title, description, action), step)| NextStep {
        step,
        title: title.to_string(),
        description: description.to_string(),
        action: action.to_string(),
    })
    .collect()
}

/// `QT-<millis>-<6 hex digits>`
///
/// The suffix comes from the thread-local OS-seeded generator, so seeded
/// runs keep reproducible analyses without sharing ids.
pub fn quote_id(timestamp: &DateTime<Utc>) -> String {
    format!(
        "QT-{}-{:06X}",
        timestamp.timestamp_millis(),
        rand::rng().random_range(0..0x100_0000u32)
    )
}

/// Builds the final quote once every file has been analysed
pub struct QuoteAssembler<'a> {
    pacer: &'a Pacer,
    pricing: &'a PricingConfig,
}

impl<'a> QuoteAssembler<'a> {
    pub fn new(pacer: &'a Pacer, pricing: &'a PricingConfig) -> Self {
        Self { pacer, pricing }
    }

    pub async fn assemble(
        &self,
        files: Vec<FileAnalysisRecord>,
        observer: &dyn ProgressObserver,
    ) -> Quote {
        self.pacer.pause_units(QUOTE_DELAY).await;
        observer.on_progress(ProgressEvent::new(Stage::Quote, 100.0, "Generating quote"));

        let summary = summarize(&files);
        let analysis = QuoteAnalysis { files, summary };
        let timestamp = Utc::now();
        let id = quote_id(&timestamp);
        debug!("Assembled quote {} for {} files", id, analysis.summary.total_files);

        Quote {
            id,
            timestamp,
            recommendations: recommend(&analysis),
            competitor_comparison: compare_competitors(
                analysis.summary.total_cost,
                &self.pricing.competitors,
            ),
            analysis,
            quality_promises: quality_promises(),
            next_steps: next_steps(),
        }
    }
}
