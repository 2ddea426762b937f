//! Sentence segmentation into matchable units with page provenance

use crate::error::Result;
use crate::processing::document::NormalizedPage;
use unicode_segmentation::UnicodeSegmentation;

/// Sentence boundary capability.
pub trait SentenceSplitter: Send + Sync {
    /// Split text into ordered, non-empty sentences.
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

/// UAX #29 sentence boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .unicode_sentences()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

/// One matchable span and the page it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit<'a> {
    pub text: &'a str,
    pub origin_page_number: u32,
}

/// Document-wide units in reading order.
///
/// `units` and `origin_pages` are parallel arrays. Lower-cased and canonical
/// forms of every unit are computed once here so per-phrase matching never
/// repeats unit-side work.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitCorpus {
    units: Vec<String>,
    origin_pages: Vec<u32>,
    lowered: Vec<String>,
    canonical: Vec<String>,
}

impl UnitCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: String, page_number: u32) {
        self.lowered.push(text.to_lowercase());
        self.canonical.push(canonicalize(&text));
        self.units.push(text);
        self.origin_pages.push(page_number);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn origin_pages(&self) -> &[u32] {
        &self.origin_pages
    }

    pub fn lowered(&self, index: usize) -> &str {
        &self.lowered[index]
    }

    pub fn canonical(&self, index: usize) -> &str {
        &self.canonical[index]
    }

    pub fn get(&self, index: usize) -> Option<Unit<'_>> {
        Some(Unit {
            text: self.units.get(index)?,
            origin_page_number: self.origin_pages[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Unit<'_>> {
        self.units
            .iter()
            .zip(self.origin_pages.iter())
            .map(|(text, &origin_page_number)| Unit {
                text,
                origin_page_number,
            })
    }
}

/// Canonical form for fuzzy comparison: lower-case, punctuation to spaces,
/// whitespace collapsed, trimmed.
pub fn canonicalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct Segmenter {
    splitter: Box<dyn SentenceSplitter>,
}

impl Segmenter {
    pub fn new(splitter: impl SentenceSplitter + 'static) -> Self {
        Self {
            splitter: Box::new(splitter),
        }
    }

    /// Split one page into units: sentences, then colon-separated parts.
    pub fn segment_page(&self, text: &str) -> Result<Vec<String>> {
        let mut units = Vec::new();
        for sentence in self.splitter.split(text)? {
            units.extend(
                sentence
                    .split(':')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(units)
    }

    /// Segment every non-excluded page into one document-wide corpus.
    pub fn segment(&self, pages: &[NormalizedPage]) -> Result<UnitCorpus> {
        let mut corpus = UnitCorpus::new();
        for page in pages.iter().filter(|p| !p.is_excluded()) {
            for unit in self.segment_page(&page.text)? {
                corpus.push(unit, page.page_number);
            }
        }
        Ok(corpus)
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(UnicodeSentenceSplitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckerError;

    fn page(number: u32, text: &str) -> NormalizedPage {
        NormalizedPage {
            page_number: number,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_colon_split_isolates_heading_and_value() {
        let segmenter = Segmenter::default();
        let units = segmenter.segment_page("Device Trade Name: AcmeScan 200").unwrap();
        assert_eq!(units, vec!["Device Trade Name", "AcmeScan 200"]);
    }

    #[test]
    fn test_sentences_keep_document_order() {
        let segmenter = Segmenter::default();
        let corpus = segmenter
            .segment(&[
                page(1, "The device is a reader. It measures glucose."),
                page(2, "Predicate: K123456"),
            ])
            .unwrap();

        assert_eq!(
            corpus.units(),
            &["The device is a reader.", "It measures glucose.", "Predicate", "K123456"]
        );
        assert_eq!(corpus.origin_pages(), &[1, 1, 2, 2]);
    }

    #[test]
    fn test_excluded_pages_contribute_nothing() {
        let segmenter = Segmenter::default();
        let corpus = segmenter.segment(&[page(1, ""), page(2, "Intended use.")]).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(0).unwrap().origin_page_number, 2);
    }

    #[test]
    fn test_empty_colon_parts_are_dropped() {
        let segmenter = Segmenter::default();
        let units = segmenter.segment_page("Sample type:: serum :").unwrap();
        assert_eq!(units, vec!["Sample type", "serum"]);
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("  Predicate  Clearance-Number (K123456)! "), "predicate clearance number k123456");
        assert_eq!(canonicalize("---"), "");
    }

    #[test]
    fn test_corpus_forms_are_parallel() {
        let mut corpus = UnitCorpus::new();
        corpus.push("Limit of Detection".to_string(), 4);
        assert_eq!(corpus.lowered(0), "limit of detection");
        assert_eq!(corpus.canonical(0), "limit of detection");
        assert_eq!(corpus.iter().count(), corpus.origin_pages().len());
    }

    struct FailingSplitter;

    impl SentenceSplitter for FailingSplitter {
        fn split(&self, _text: &str) -> Result<Vec<String>> {
            Err(CheckerError::tokenizer("model not loaded"))
        }
    }

    #[test]
    fn test_splitter_failure_propagates() {
        let segmenter = Segmenter::new(FailingSplitter);
        let result = segmenter.segment(&[page(1, "text")]);
        assert!(matches!(result, Err(CheckerError::CapabilityUnavailable { .. })));
    }
}
