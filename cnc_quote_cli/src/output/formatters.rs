use super::{FormReport, OutputFormatter};
use crate::progress::{format_bytes, format_lead_time};
use anyhow::Result;
use cnc_quote_core::{BatchValidation, FileAnalysisRecord, Quote};
use colored::*;
use serde::Serialize;
use serde_json::json;

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.colorize(text, |s| s.bold())
    }

    fn file_section(&self, output: &mut String, record: &FileAnalysisRecord) {
        let pricing = &record.cost.pricing;
        output.push_str(&format!(
            "  {} ({})\n",
            self.colorize(&record.name, |s| s.cyan()),
            format_bytes(record.size)
        ));
        output.push_str(&format!(
            "    Complexity: {:.2} ({})  Volume: {:.0} cm³  Weight: {:.0} g\n",
            record.features.complexity,
            record.manufacturing.difficulty.as_str(),
            record.features.volume,
            record.features.estimated_weight
        ));
        let processes: Vec<&str> = record
            .manufacturing
            .processes
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        output.push_str(&format!("    Processes: {}\n", processes.join(", ")));
        if let Some(material) = record.materials.first() {
            output.push_str(&format!(
                "    Material: {} (suitability {:.0}%)\n",
                material.name,
                material.suitability * 100.0
            ));
        }
        output.push_str(&format!(
            "    Price: {}  Market: {}  Saving: {}%  Lead time: {}\n",
            self.colorize(&pricing.total.to_string(), |s| s.green()),
            pricing.market_price,
            pricing.savings_percentage,
            format_lead_time(record.cost.timeline.total)
        ));
    }
}

impl OutputFormatter for TextFormatter {
    fn format_quote(&self, quote: &Quote) -> Result<String> {
        let mut output = String::new();
        let summary = &quote.analysis.summary;

        output.push_str(&format!(
            "{} {}\n",
            self.heading("Quote"),
            self.colorize(&quote.id, |s| s.yellow())
        ));
        output.push_str(&format!(
            "Issued: {}\n",
            quote.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str(&format!("\n{}\n", self.heading("Files")));
        for record in &quote.analysis.files {
            self.file_section(&mut output, record);
        }

        output.push_str(&format!("\n{}\n", self.heading("Summary")));
        output.push_str(&format!("  Files: {}\n", summary.total_files));
        output.push_str(&format!("  Total volume: {} cm³\n", summary.total_volume));
        output.push_str(&format!("  Average complexity: {:.2}\n", summary.avg_complexity));
        output.push_str(&format!(
            "  Total price: {}\n",
            self.colorize(&summary.total_cost.to_string(), |s| s.green().bold())
        ));
        output.push_str(&format!("  Market price: {}\n", summary.total_market_price));
        output.push_str(&format!("  You save: {}\n", summary.total_savings));
        output.push_str(&format!(
            "  Estimated delivery: {}\n",
            format_lead_time(summary.estimated_delivery)
        ));

        if !quote.recommendations.is_empty() {
            output.push_str(&format!("\n{}\n", self.heading("Recommendations")));
            for rec in &quote.recommendations {
                output.push_str(&format!(
                    "  • {}: {} ({})\n",
                    self.colorize(&rec.title, |s| s.yellow()),
                    rec.description,
                    rec.impact
                ));
            }
        }

        output.push_str(&format!("\n{}\n", self.heading("Competitors")));
        for competitor in &quote.competitor_comparison {
            output.push_str(&format!(
                "  {:<10} {:>10}  {}\n",
                competitor.name, competitor.price, competitor.delivery
            ));
        }

        output.push_str(&format!("\n{}\n", self.heading("Next steps")));
        for step in &quote.next_steps {
            output.push_str(&format!(
                "  {}. {}: {}\n",
                step.step, step.title, step.description
            ));
        }

        Ok(output)
    }

    fn format_validation(&self, validation: &BatchValidation) -> Result<String> {
        let mut output = String::new();

        for file in &validation.accepted {
            output.push_str(&format!(
                "{} {} ({})\n",
                self.colorize("✓", |s| s.green()),
                file.name(),
                format_bytes(file.size())
            ));
        }
        for rejected in &validation.rejected {
            output.push_str(&format!(
                "{} {} ({})\n",
                self.colorize("✗", |s| s.red()),
                rejected.file.name(),
                format_bytes(rejected.file.size())
            ));
            for violation in &rejected.violations {
                output.push_str(&format!("    {violation}\n"));
            }
        }

        // Batch-level failures reject before any file is inspected
        if validation.accepted.is_empty() && validation.rejected.is_empty() {
            for error in &validation.errors {
                output.push_str(&format!("{} {}\n", self.colorize("✗", |s| s.red()), error));
            }
        }

        for warning in &validation.warnings {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("!", |s| s.yellow()),
                warning
            ));
        }

        let verdict = if validation.is_valid() {
            self.colorize("Batch accepted", |s| s.green().bold())
        } else {
            self.colorize("Batch rejected", |s| s.red().bold())
        };
        output.push_str(&format!("{verdict}\n"));

        Ok(output)
    }

    fn format_form(&self, report: &FormReport) -> Result<String> {
        let mut output = String::new();
        let kind = report.kind.as_str();

        for error in &report.validation.errors {
            output.push_str(&format!("{} {}\n", self.colorize("✗", |s| s.red()), error));
        }
        for warning in &report.validation.warnings {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("!", |s| s.yellow()),
                warning
            ));
        }

        match &report.submission_id {
            Some(id) => output.push_str(&format!(
                "{} {kind} form accepted as {}\n",
                self.colorize("✓", |s| s.green()),
                self.colorize(id, |s| s.cyan())
            )),
            None => output.push_str(&format!(
                "{}\n",
                self.colorize(&format!("{kind} form rejected"), |s| s.red().bold())
            )),
        }

        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_quote(&self, quote: &Quote) -> Result<String> {
        self.render(quote)
    }

    fn format_validation(&self, validation: &BatchValidation) -> Result<String> {
        let rejected: Vec<_> = validation
            .rejected
            .iter()
            .map(|r| {
                json!({
                    "name": r.file.name(),
                    "size": r.file.size(),
                    "violations": r.violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
                })
            })
            .collect();

        self.render(&json!({
            "valid": validation.is_valid(),
            "accepted": validation.accepted,
            "rejected": rejected,
            "errors": validation.errors,
            "warnings": validation.warnings,
        }))
    }

    fn format_form(&self, report: &FormReport) -> Result<String> {
        self.render(&json!({
            "kind": report.kind,
            "valid": report.validation.is_valid(),
            "id": report.submission_id,
            "errors": report.validation.errors,
            "warnings": report.validation.warnings,
        }))
    }
}

/// CSV formatter for tabular output, one row per file
pub struct CsvFormatter;

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct QuoteRow<'a> {
    quote_id: &'a str,
    file: &'a str,
    size: u64,
    extension: &'a str,
    complexity: f64,
    difficulty: &'static str,
    material: &'a str,
    material_cost: u64,
    machining_cost: u64,
    surface_treatment_cost: u64,
    quality_control_cost: u64,
    shipping_cost: u64,
    subtotal: u64,
    total: u64,
    market_price: u64,
    savings_percentage: u32,
    lead_time_hours: u64,
}

#[derive(Serialize)]
struct ValidationRow<'a> {
    file: &'a str,
    size: u64,
    status: &'static str,
    violations: String,
}

#[derive(Serialize)]
struct FormRow<'a> {
    level: &'static str,
    message: &'a str,
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in rows {
            wtr.serialize(row)?;
        }
        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_quote(&self, quote: &Quote) -> Result<String> {
        Self::write_rows(quote.analysis.files.iter().map(|record| {
            let cost = &record.cost;
            QuoteRow {
                quote_id: &quote.id,
                file: &record.name,
                size: record.size,
                extension: &record.extension,
                complexity: record.features.complexity,
                difficulty: record.manufacturing.difficulty.as_str(),
                material: record.materials.first().map_or("", |m| m.name.as_str()),
                material_cost: cost.breakdown.material,
                machining_cost: cost.breakdown.machining,
                surface_treatment_cost: cost.breakdown.surface_treatment,
                quality_control_cost: cost.breakdown.quality_control,
                shipping_cost: cost.breakdown.shipping,
                subtotal: cost.pricing.subtotal,
                total: cost.pricing.total,
                market_price: cost.pricing.market_price,
                savings_percentage: cost.pricing.savings_percentage,
                lead_time_hours: cost.timeline.total,
            }
        }))
    }

    fn format_validation(&self, validation: &BatchValidation) -> Result<String> {
        let accepted = validation.accepted.iter().map(|f| ValidationRow {
            file: f.name(),
            size: f.size(),
            status: "accepted",
            violations: String::new(),
        });
        let rejected = validation.rejected.iter().map(|r| ValidationRow {
            file: r.file.name(),
            size: r.file.size(),
            status: "rejected",
            violations: r
                .violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        });
        Self::write_rows(accepted.chain(rejected))
    }

    fn format_form(&self, report: &FormReport) -> Result<String> {
        let errors = report.validation.errors.iter().map(|m| FormRow {
            level: "error",
            message: m,
        });
        let warnings = report.validation.warnings.iter().map(|m| FormRow {
            level: "warning",
            message: m,
        });
        Self::write_rows(errors.chain(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnc_quote_core::forms::{FormKind, FormValidation};
    use cnc_quote_core::{CandidateFile, ValidationLimits, validate_batch};

    fn report(errors: Vec<&str>, warnings: Vec<&str>, id: Option<&str>) -> FormReport {
        FormReport {
            kind: FormKind::Contact,
            validation: FormValidation {
                errors: errors.into_iter().map(String::from).collect(),
                warnings: warnings.into_iter().map(String::from).collect(),
            },
            submission_id: id.map(String::from),
        }
    }

    fn mixed_batch() -> BatchValidation {
        validate_batch(
            &[
                CandidateFile::new("bracket.step", 2 * 1024 * 1024),
                CandidateFile::new("model.xyz", 10),
            ],
            &ValidationLimits::default(),
        )
    }

    #[test]
    fn test_text_validation_lists_each_file() {
        let text = TextFormatter::new(false)
            .format_validation(&mixed_batch())
            .unwrap();
        assert!(text.contains("✓ bracket.step (2.00 MB)"));
        assert!(text.contains("✗ model.xyz (10 B)"));
        assert!(text.contains("    Unsupported file format: xyz"));
        assert!(text.ends_with("Batch rejected\n"));
    }

    #[test]
    fn test_text_validation_batch_level_error() {
        let batch = validate_batch(&[], &ValidationLimits::default());
        let text = TextFormatter::new(false).format_validation(&batch).unwrap();
        assert!(text.contains("✗ Select at least one file to upload"));
    }

    #[test]
    fn test_json_validation_shape() {
        let text = JsonFormatter::new(false)
            .format_validation(&mixed_batch())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["rejected"][0]["name"], "model.xyz");
        assert_eq!(value["accepted"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_validation_rows() {
        let text = CsvFormatter::new().format_validation(&mixed_batch()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "file,size,status,violations");
        assert_eq!(lines[1], "bracket.step,2097152,accepted,");
        assert_eq!(lines[2], "model.xyz,10,rejected,Unsupported file format: xyz");
    }

    #[test]
    fn test_form_outputs() {
        let accepted = report(vec![], vec!["Message is short"], Some("contact_1_abc"));
        let text = TextFormatter::new(false).format_form(&accepted).unwrap();
        assert!(text.contains("! Message is short"));
        assert!(text.contains("contact form accepted as contact_1_abc"));

        let rejected = report(vec!["Email is required"], vec![], None);
        let json = JsonFormatter::new(false).format_form(&rejected).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "contact");
        assert_eq!(value["valid"], false);
        assert!(value["id"].is_null());

        let csv = CsvFormatter::new().format_form(&rejected).unwrap();
        assert_eq!(csv, "level,message\nerror,Email is required\n");
    }
}
