//! Page text normalization

use crate::error::{CheckerError, Result};
use crate::processing::document::{NormalizedPage, Page};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Submission number followed by a "Page X of Y" marker, as printed in FDA summaries.
pub const DEFAULT_BANNER_PATTERN: &str = r"K\d{6,7}.*Page \d+ of \d+";

const SOFT_HYPHEN: char = '\u{00AD}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnicodeForm {
    /// Canonical composition.
    Nfc,
    /// Compatibility composition; also folds ligatures and full-width forms.
    Nfkc,
}

pub struct TextProcessor {
    unicode_form: UnicodeForm,
    hyphen_break_regex: Regex,
    banner_regexes: Vec<Regex>,
    whitespace_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        Self::with_banner_patterns(UnicodeForm::Nfc, &[DEFAULT_BANNER_PATTERN.to_string()])
            .expect("Invalid default banner regex")
    }

    /// Build a processor with custom header/footer banner patterns (case-insensitive).
    pub fn with_banner_patterns(unicode_form: UnicodeForm, patterns: &[String]) -> Result<Self> {
        let banner_regexes = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| CheckerError::Configuration(format!("Invalid banner pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let hyphen_break_regex = Regex::new(r"-[^\S\n]*\r?\n\s*").expect("Invalid hyphen break regex");
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Ok(Self {
            unicode_form,
            hyphen_break_regex,
            banner_regexes,
            whitespace_regex,
        })
    }

    /// Normalize one page. An empty result marks the page as excluded.
    pub fn normalize_page(&self, page: &Page) -> NormalizedPage {
        NormalizedPage {
            page_number: page.page_number,
            text: self.normalize(&page.raw_text),
        }
    }

    /// Clean raw page text: unicode form, soft hyphens, banner lines,
    /// hyphenated line breaks, whitespace.
    ///
    /// Banner lines go before hyphen joins so a word broken across a footer
    /// is rejoined and content is never merged into a banner line.
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = match self.unicode_form {
            UnicodeForm::Nfc => text.nfc().collect(),
            UnicodeForm::Nfkc => text.nfkc().collect(),
        };

        let without_soft_hyphens: String = composed.chars().filter(|&c| c != SOFT_HYPHEN).collect();

        let without_banners = self.strip_banner_lines(&without_soft_hyphens);

        let joined = self.hyphen_break_regex.replace_all(&without_banners, "");

        self.normalize_whitespace(&joined)
    }

    /// Drop every line matching one of the banner patterns
    fn strip_banner_lines(&self, text: &str) -> String {
        text.lines()
            .filter(|line| !self.is_banner_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_banner_line(&self, line: &str) -> bool {
        self.banner_regexes.iter().any(|re| re.is_match(line))
    }

    /// Collapse whitespace runs into single spaces and trim
    fn normalize_whitespace(&self, text: &str) -> String {
        self.whitespace_regex.replace_all(text, " ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_hyphenated_line_breaks() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("substantial equiva-\n  lence to the predicate");
        assert_eq!(cleaned, "substantial equivalence to the predicate");
    }

    #[test]
    fn test_hyphen_with_trailing_space_before_newline() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("immuno- \nassay");
        assert_eq!(cleaned, "immunoassay");
    }

    #[test]
    fn test_removes_soft_hyphens() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("quanti\u{00AD}tation");
        assert_eq!(cleaned, "quantitation");
    }

    #[test]
    fn test_strips_banner_lines() {
        let processor = TextProcessor::new();
        let raw = "K123456 Decision Summary Page 3 of 12\nIntended Use: qualitative detection\nk1234567 page 4 OF 12";
        let cleaned = processor.normalize(raw);
        assert_eq!(cleaned, "Intended Use: qualitative detection");
    }

    #[test]
    fn test_hyphen_before_banner_line_keeps_content() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("Intended use: measurement of glucose in whole-\nK123456 Decision Summary Page 3 of 12");
        assert_eq!(cleaned, "Intended use: measurement of glucose in whole-");
    }

    #[test]
    fn test_word_broken_across_banner_line_is_rejoined() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("the quanti-\nK123456 Decision Summary Page 3 of 12\ntative measurement");
        assert_eq!(cleaned, "the quantitative measurement");
    }

    #[test]
    fn test_keeps_inline_hyphens_and_collapses_whitespace() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("  point-of-care\t\ttest \n\n results  ");
        assert_eq!(cleaned, "point-of-care test results");
    }

    #[test]
    fn test_canonical_composition() {
        let processor = TextProcessor::new();
        // "e" followed by a combining acute accent composes to a single code point
        let cleaned = processor.normalize("Re\u{0301}sume\u{0301}");
        assert_eq!(cleaned, "R\u{00E9}sum\u{00E9}");
    }

    #[test]
    fn test_nfkc_folds_ligatures() {
        let processor = TextProcessor::with_banner_patterns(UnicodeForm::Nfkc, &[]).unwrap();
        assert_eq!(processor.normalize("\u{FB01}ndings"), "findings");

        let nfc = TextProcessor::with_banner_patterns(UnicodeForm::Nfc, &[]).unwrap();
        assert_eq!(nfc.normalize("\u{FB01}ndings"), "\u{FB01}ndings");
    }

    #[test]
    fn test_empty_page_is_excluded() {
        let processor = TextProcessor::new();
        let page = Page::new("doc", 2, "  \n K123456 Page 2 of 9 \n\t");
        let normalized = processor.normalize_page(&page);
        assert_eq!(normalized.page_number, 2);
        assert!(normalized.is_excluded());
    }

    #[test]
    fn test_invalid_banner_pattern_is_configuration_error() {
        let result = TextProcessor::with_banner_patterns(UnicodeForm::Nfc, &["(unclosed".to_string()]);
        assert!(matches!(result, Err(CheckerError::Configuration(_))));
    }
}
