//! Report envelope: a compliance report plus the run metadata the formatters print

use crate::processing::analyzer::ComplianceReport;
use crate::processing::field_matcher::MatchThresholds;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How the pathway of a document was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathwaySource {
    Detected,
    Overridden,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub checker_version: String,
    pub document: String,
    pub page_count: usize,
    pub embedding_model: String,
    pub fuzzy_threshold: f64,
    pub semantic_threshold: f32,
    pub pathway_source: PathwaySource,
    pub processing_time_ms: u64,
}

/// One evaluated document as handed to the formatters.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub metadata: ReportMetadata,
    pub report: ComplianceReport,
}

impl DocumentReport {
    pub fn new(
        document: &str,
        page_count: usize,
        report: ComplianceReport,
        embedding_model: &str,
        thresholds: MatchThresholds,
        pathway_source: PathwaySource,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                checker_version: env!("CARGO_PKG_VERSION").to_string(),
                document: document.to_string(),
                page_count,
                embedding_model: embedding_model.to_string(),
                fuzzy_threshold: thresholds.fuzzy,
                semantic_threshold: thresholds.semantic,
                pathway_source,
                processing_time_ms,
            },
            report,
        }
    }

    /// Found/total as a whole percentage.
    pub fn coverage_percentage(&self) -> u8 {
        (self.report.coverage() * 100.0).round() as u8
    }

    pub fn verdict(&self) -> &'static str {
        if self.report.complete {
            "All required fields located"
        } else if self.report.found_count() == 0 {
            "No required fields located"
        } else {
            "Required fields missing"
        }
    }
}
