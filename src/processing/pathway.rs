//! Regulatory pathway detection

use crate::error::{CheckerError, Result};
use crate::processing::document::NormalizedPage;
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pathway {
    #[serde(rename = "510k")]
    PremarketNotification,
    #[serde(rename = "denovo")]
    DeNovo,
    #[serde(rename = "pma")]
    PremarketApproval,
}

impl Pathway {
    pub const ALL: [Pathway; 3] = [Pathway::PremarketNotification, Pathway::DeNovo, Pathway::PremarketApproval];

    /// Stable identifier used in checklist file names and reports.
    pub fn id(&self) -> &'static str {
        match self {
            Pathway::PremarketNotification => "510k",
            Pathway::DeNovo => "denovo",
            Pathway::PremarketApproval => "pma",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pathway::PremarketNotification => "510(k) Premarket Notification",
            Pathway::DeNovo => "De Novo Classification",
            Pathway::PremarketApproval => "Premarket Approval (PMA)",
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Pathway {
    type Err = CheckerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "510k" | "510(k)" => Ok(Pathway::PremarketNotification),
            "denovo" | "de novo" | "de-novo" => Ok(Pathway::DeNovo),
            "pma" => Ok(Pathway::PremarketApproval),
            _ => Err(CheckerError::InvalidInput(format!(
                "Unknown pathway: {}. Supported: 510k, denovo, pma",
                s
            ))),
        }
    }
}

/// Literal markers in priority order; anything without a marker falls back to PMA.
const MARKERS: [(&str, Pathway); 2] = [("510(k)", Pathway::PremarketNotification), ("de novo", Pathway::DeNovo)];

const FALLBACK: Pathway = Pathway::PremarketApproval;

pub struct PathwayClassifier {
    matcher: AhoCorasick,
}

impl Default for PathwayClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PathwayClassifier {
    pub fn new() -> Self {
        let patterns: Vec<&str> = MARKERS.iter().map(|(marker, _)| *marker).collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("Invalid pathway markers");

        Self { matcher }
    }

    /// Pick the highest-priority marker present anywhere in the text, regardless of position.
    pub fn classify(&self, text: &str) -> Pathway {
        self.matcher
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|id| MARKERS[id].1)
            .unwrap_or(FALLBACK)
    }

    /// Classify a whole document from its normalized pages; excluded pages are ignored.
    pub fn classify_pages(&self, pages: &[NormalizedPage]) -> Pathway {
        let full_text = pages
            .iter()
            .filter(|p| !p.is_excluded())
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.classify(&full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_510k_marker_wins_over_later_priority() {
        let classifier = PathwayClassifier::new();
        let text = "This De Novo request references a prior 510(k) clearance.";
        assert_eq!(classifier.classify(text), Pathway::PremarketNotification);
    }

    #[test]
    fn test_de_novo_case_insensitive() {
        let classifier = PathwayClassifier::new();
        assert_eq!(classifier.classify("EVALUATION OF AUTOMATIC CLASS III DESIGNATION (DE NOVO)"), Pathway::DeNovo);
    }

    #[test]
    fn test_fallback_is_pma() {
        let classifier = PathwayClassifier::new();
        assert_eq!(classifier.classify("Summary of Safety and Effectiveness Data"), Pathway::PremarketApproval);
        assert_eq!(classifier.classify(""), Pathway::PremarketApproval);
    }

    #[test]
    fn test_classify_pages_spans_page_boundaries() {
        let classifier = PathwayClassifier::new();
        let pages = vec![
            NormalizedPage { page_number: 1, text: "Decision summary".to_string() },
            NormalizedPage { page_number: 2, text: String::new() },
            NormalizedPage { page_number: 3, text: "Predicate: 510(k) K123456".to_string() },
        ];
        assert_eq!(classifier.classify_pages(&pages), Pathway::PremarketNotification);
    }

    #[test]
    fn test_pathway_ids_round_trip() {
        for pathway in Pathway::ALL {
            assert_eq!(pathway.id().parse::<Pathway>().unwrap(), pathway);
        }
        assert!("ide".parse::<Pathway>().is_err());
    }

    #[test]
    fn test_serializes_as_id() {
        let json = serde_json::to_string(&Pathway::PremarketNotification).unwrap();
        assert_eq!(json, "\"510k\"");
    }
}
