//! Output formatting for analysis reports

use advisor_analyzers::{BatchOutcome, ResolvedAnalyzer};
use advisor_core::{AdvisorError, CompositeResult, Result};
use clap::ValueEnum;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            Self::Table => Box::new(TableFormatter),
            Self::Json => Box::new(JsonFormatter),
            Self::Csv => Box::new(CsvFormatter),
        }
    }
}

pub trait Formatter: Send + Sync {
    /// Render analysis outcomes; `detail` adds per-analyzer breakdowns
    fn format_outcomes(&self, outcomes: &[BatchOutcome], detail: bool) -> Result<String>;

    /// Render the resolved analyzer settings
    fn format_analyzers(&self, analyzers: &[ResolvedAnalyzer]) -> Result<String>;
}

fn target(result: &CompositeResult) -> String {
    result
        .target_price
        .map_or_else(|| "-".to_string(), |t| format!("{t:.2}"))
}

fn coverage(result: &CompositeResult) -> String {
    format!(
        "{}/{}",
        result.coverage.contributing, result.coverage.enabled
    )
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub struct TableFormatter;

impl TableFormatter {
    fn detail(result: &CompositeResult) -> String {
        let mut table = new_table();
        table.set_header(vec!["Analyzer", "Signal", "Score", "Confidence"]);
        for analysis in result.analyzers.values() {
            table.add_row(vec![
                analysis.analyzer_name.clone(),
                analysis.recommendation_type.to_string(),
                format!("{:+.3}", analysis.score),
                format!("{:.0}%", analysis.confidence * 100.0),
            ]);
        }

        let mut output = format!("\n{}\n{table}\n", result.summary());
        for line in result.reasoning_lines() {
            output.push_str(&format!("  - {line}\n"));
        }
        if !result.inapplicable.is_empty() {
            output.push_str(&format!(
                "  Not applicable: {}\n",
                result.inapplicable.join(", ")
            ));
        }
        for failure in &result.failures {
            output.push_str(&format!(
                "  Failed: {} ({})\n",
                failure.analyzer, failure.error
            ));
        }
        output
    }
}

impl Formatter for TableFormatter {
    fn format_outcomes(&self, outcomes: &[BatchOutcome], detail: bool) -> Result<String> {
        let mut table = new_table();
        table.set_header(vec![
            "Symbol",
            "Recommendation",
            "Score",
            "Confidence",
            "Coverage",
            "Target",
        ]);

        let mut errors = Vec::new();
        for outcome in outcomes {
            match &outcome.result {
                Ok(result) => {
                    table.add_row(vec![
                        result.symbol.clone(),
                        result.recommendation_type.to_string(),
                        format!("{:+.3}", result.score),
                        format!("{:.0}%", result.confidence * 100.0),
                        coverage(result),
                        target(result),
                    ]);
                }
                Err(e) => {
                    table.add_row(vec![
                        outcome.symbol.clone(),
                        "ERROR".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                        "-".to_string(),
                    ]);
                    errors.push(format!("{}: {e}", outcome.symbol));
                }
            }
        }

        let mut output = table.to_string();
        output.push('\n');
        for error in errors {
            output.push_str(&format!("Error: {error}\n"));
        }
        if detail {
            for result in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
                output.push_str(&Self::detail(result));
            }
        }
        Ok(output)
    }

    fn format_analyzers(&self, analyzers: &[ResolvedAnalyzer]) -> Result<String> {
        let mut table = new_table();
        table.set_header(vec!["Analyzer", "Description", "Enabled", "Weight"]);
        for resolved in analyzers {
            table.add_row(vec![
                resolved.name().to_string(),
                resolved.analyzer.description().to_string(),
                if resolved.config.enabled { "yes" } else { "no" }.to_string(),
                format!("{:.2}", resolved.config.weight),
            ]);
        }
        Ok(format!("{table}\n"))
    }
}

/// Always emits complete results
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_outcomes(&self, outcomes: &[BatchOutcome], _detail: bool) -> Result<String> {
        let values = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(result) => serde_json::to_value(result),
                Err(e) => Ok(json!({ "symbol": outcome.symbol, "error": e.to_string() })),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(serde_json::to_string_pretty(&values)?)
    }

    fn format_analyzers(&self, analyzers: &[ResolvedAnalyzer]) -> Result<String> {
        let values: Vec<_> = analyzers
            .iter()
            .map(|r| {
                json!({
                    "name": r.name(),
                    "description": r.analyzer.description(),
                    "enabled": r.config.enabled,
                    "weight": r.config.weight,
                })
            })
            .collect();
        Ok(serde_json::to_string_pretty(&values)?)
    }
}

pub struct CsvFormatter;

impl CsvFormatter {
    fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
        let bytes = writer
            .into_inner()
            .map_err(|e| AdvisorError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| AdvisorError::Other(format!("CSV output is not UTF-8: {e}")))
    }
}

impl Formatter for CsvFormatter {
    fn format_outcomes(&self, outcomes: &[BatchOutcome], detail: bool) -> Result<String> {
        let mut header = vec![
            "symbol",
            "recommendation",
            "score",
            "confidence",
            "contributing",
            "enabled",
            "target_price",
            "error",
        ];
        if detail {
            header.push("reasoning");
        }
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&header)?;

        for outcome in outcomes {
            let mut fields = match &outcome.result {
                Ok(r) => vec![
                    r.symbol.clone(),
                    r.recommendation_type.to_string(),
                    format!("{:.4}", r.score),
                    format!("{:.4}", r.confidence),
                    r.coverage.contributing.to_string(),
                    r.coverage.enabled.to_string(),
                    r.target_price.map(|t| format!("{t:.2}")).unwrap_or_default(),
                    String::new(),
                ],
                Err(e) => {
                    let mut fields = vec![outcome.symbol.clone()];
                    fields.extend(std::iter::repeat_n(String::new(), 6));
                    fields.push(e.to_string());
                    fields
                }
            };
            if detail {
                let reasoning = outcome
                    .result
                    .as_ref()
                    .map(|r| r.reasoning_lines().join(" | "))
                    .unwrap_or_default();
                fields.push(reasoning);
            }
            writer.write_record(&fields)?;
        }
        Self::finish(writer)
    }

    fn format_analyzers(&self, analyzers: &[ResolvedAnalyzer]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["name", "description", "enabled", "weight"])?;
        for r in analyzers {
            writer.write_record([
                r.name().to_string(),
                r.analyzer.description().to_string(),
                r.config.enabled.to_string(),
                r.config.weight.to_string(),
            ])?;
        }
        Self::finish(writer)
    }
}
