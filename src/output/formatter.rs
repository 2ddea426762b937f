//! Output formatters: console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{DocumentReport, PathwaySource};
use crate::processing::analyzer::FieldResult;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter. Emits the compliance report only, so output is stable across runs.
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn format_pages(pages: &[u32]) -> String {
    pages.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_status_badge(&self, complete: bool) -> String {
        let (badge, color) = if complete {
            ("COMPLETE", Color::Green)
        } else {
            ("INCOMPLETE", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_field(&self, result: &FieldResult) -> String {
        let mut line = if result.found {
            format!(
                "  {} {} (pages {})\n",
                self.colorize("✓", Color::Green),
                result.field_id,
                format_pages(&result.evidence_pages)
            )
        } else {
            format!("  {} {}\n", self.colorize("✗", Color::Red), self.colorize(&result.field_id, Color::Red))
        };

        if self.detailed {
            line.push_str(&format!("      {}\n", self.colorize(&result.question, Color::BrightBlack)));
            if let Some(phrase) = &result.matched_phrase {
                line.push_str(&format!("      matched \"{}\" in {} unit(s)\n", phrase, result.unit_hits));
            }
        }

        line
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<String> {
        let metadata = &report.metadata;
        let compliance = &report.report;
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("SUBMISSION CHECK: {}", metadata.document), 1));
        output.push_str(&format!(
            "Generated: {} | Pages: {} | Processing time: {}ms\n",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            metadata.page_count,
            metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Summary", 2));
        let source = match metadata.pathway_source {
            PathwaySource::Detected => "detected",
            PathwaySource::Overridden => "overridden",
        };
        output.push_str(&format!(
            "Pathway: {} ({})\n",
            self.colorize(compliance.pathway.display_name(), Color::Cyan),
            source
        ));
        output.push_str(&format!(
            "Fields found: {}/{} ({}%) {}\n",
            compliance.found_count(),
            compliance.field_results.len(),
            report.coverage_percentage(),
            self.format_status_badge(compliance.complete)
        ));
        output.push_str(&format!("Verdict: {}\n", self.colorize(report.verdict(), Color::Cyan)));

        output.push_str(&self.format_header("Checklist", 3));
        for result in &compliance.field_results {
            output.push_str(&self.format_field(result));
        }

        let missing = compliance.missing_fields();
        if !missing.is_empty() {
            output.push_str(&self.format_header("Missing Fields", 3));
            for result in missing {
                output.push_str(&format!("  • {}\n", result.question));
            }
        }

        if self.detailed {
            output.push_str(&self.format_header("Matching", 3));
            output.push_str(&format!("Embedding model: {}\n", metadata.embedding_model));
            output.push_str(&format!(
                "Thresholds: fuzzy {:.1}, semantic {:.2}\n",
                metadata.fuzzy_threshold, metadata.semantic_threshold
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(&report.report)?)
        } else {
            Ok(serde_json::to_string(&report.report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &DocumentReport) -> Result<String> {
        let metadata = &report.metadata;
        let compliance = &report.report;
        let mut output = String::new();

        output.push_str(&format!("# Submission Check: `{}`\n\n", metadata.document));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Pages:** {} | **Processing Time:** {}ms\n\n",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                metadata.page_count,
                metadata.processing_time_ms
            ));
            output.push_str(&format!(
                "**Embedding model:** `{}` | **Fuzzy threshold:** {:.1} | **Semantic threshold:** {:.2}\n\n",
                metadata.embedding_model, metadata.fuzzy_threshold, metadata.semantic_threshold
            ));
        }

        output.push_str("## Summary\n\n");
        output.push_str(&format!("**Pathway:** {}\n\n", compliance.pathway.display_name()));
        output.push_str(&format!(
            "**Fields found:** {}/{} ({}%)\n\n",
            compliance.found_count(),
            compliance.field_results.len(),
            report.coverage_percentage()
        ));
        output.push_str(&format!(
            "**Status:** {}\n\n",
            if compliance.complete { "✅ Complete" } else { "❌ Incomplete" }
        ));

        output.push_str("## Checklist\n\n");
        output.push_str("| Field | Question | Found | Pages |\n");
        output.push_str("|-------|----------|-------|-------|\n");
        for result in &compliance.field_results {
            output.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                result.field_id,
                result.question.replace('|', "\\|"),
                if result.found { "✅" } else { "❌" },
                format_pages(&result.evidence_pages)
            ));
        }
        output.push('\n');

        let missing = compliance.missing_fields();
        if !missing.is_empty() {
            output.push_str("## Missing Fields\n\n");
            for result in missing {
                output.push_str(&format!("- **{}**: {}\n", result.field_id, result.question));
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &DocumentReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, document_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(document_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };

    format!("{}_check{}.{}", base_name, timestamp_suffix, extension)
}
