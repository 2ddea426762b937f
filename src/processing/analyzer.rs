//! Checklist evaluation: normalization, classification, segmentation, matching

use crate::checklist::{BuiltinChecklists, ChecklistField, ChecklistSource, DirectoryChecklists};
use crate::config::Config;
use crate::error::Result;
use crate::processing::document::{NormalizedPage, Page};
use crate::processing::embeddings::{Embedder, EmbeddingCache};
use crate::processing::field_matcher::{FieldMatcher, MatchThresholds};
use crate::processing::pathway::{Pathway, PathwayClassifier};
use crate::processing::segmenter::Segmenter;
use crate::processing::text_processor::TextProcessor;
use log::{debug, info, warn};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::time::Instant;

/// Verdict for one checklist field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    pub field_id: String,
    pub question: String,
    pub found: bool,
    /// Sorted, distinct page numbers of the matching units. Empty iff not found.
    pub evidence_pages: Vec<u32>,
    /// Key phrase that produced the evidence.
    pub matched_phrase: Option<String>,
    /// Number of units that matched.
    pub unit_hits: usize,
}

impl FieldResult {
    fn not_found(field: &ChecklistField) -> Self {
        Self {
            field_id: field.id.clone(),
            question: field.question.clone(),
            found: false,
            evidence_pages: Vec::new(),
            matched_phrase: None,
            unit_hits: 0,
        }
    }
}

/// Per-document outcome, fields in checklist order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceReport {
    pub pathway: Pathway,
    pub field_results: Vec<FieldResult>,
    pub complete: bool,
}

impl ComplianceReport {
    fn new(pathway: Pathway, field_results: Vec<FieldResult>) -> Self {
        let complete = field_results.iter().all(|r| r.found);
        Self {
            pathway,
            field_results,
            complete,
        }
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldResult> {
        self.field_results.iter().find(|r| r.field_id == field_id)
    }

    pub fn found_count(&self) -> usize {
        self.field_results.iter().filter(|r| r.found).count()
    }

    pub fn missing_fields(&self) -> Vec<&FieldResult> {
        self.field_results.iter().filter(|r| !r.found).collect()
    }

    /// Share of found fields, 0.0 to 1.0.
    pub fn coverage(&self) -> f32 {
        if self.field_results.is_empty() {
            return 0.0;
        }
        self.found_count() as f32 / self.field_results.len() as f32
    }
}

/// `{"pathway", "fields": {id: {"question", "found", "pages"}}, "complete"}`,
/// field keys in checklist order.
impl Serialize for ComplianceReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComplianceReport", 3)?;
        state.serialize_field("pathway", &self.pathway)?;
        state.serialize_field("fields", &FieldsByID(&self.field_results))?;
        state.serialize_field("complete", &self.complete)?;
        state.end()
    }
}

struct FieldsByID<'a>(&'a [FieldResult]);

#[derive(Serialize)]
struct FieldEntry<'a> {
    question: &'a str,
    found: bool,
    pages: &'a [u32],
}

impl Serialize for FieldsByID<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in self.0 {
            map.serialize_entry(
                &result.field_id,
                &FieldEntry {
                    question: &result.question,
                    found: result.found,
                    pages: &result.evidence_pages,
                },
            )?;
        }
        map.end()
    }
}

/// Orchestrates the matching pipeline for one document at a time.
///
/// Holds no per-document state; every `evaluate` call starts from scratch, so a
/// shared evaluator may serve several documents concurrently.
pub struct ChecklistEvaluator {
    text_processor: TextProcessor,
    segmenter: Segmenter,
    classifier: PathwayClassifier,
    matcher: FieldMatcher,
    embedder: Box<dyn Embedder>,
    checklists: Box<dyn ChecklistSource>,
}

impl ChecklistEvaluator {
    /// Evaluator with default normalization, segmentation and thresholds.
    pub fn new(embedder: Box<dyn Embedder>, checklists: Box<dyn ChecklistSource>) -> Self {
        Self {
            text_processor: TextProcessor::new(),
            segmenter: Segmenter::default(),
            classifier: PathwayClassifier::new(),
            matcher: FieldMatcher::default(),
            embedder,
            checklists,
        }
    }

    /// Build from configuration: thresholds, normalization and checklist location.
    pub fn from_config(config: &Config, embedder: Box<dyn Embedder>) -> Result<Self> {
        let checklists: Box<dyn ChecklistSource> = match &config.checklists.directory {
            Some(dir) => Box::new(DirectoryChecklists::new(dir)),
            None => Box::new(BuiltinChecklists),
        };

        let text_processor = TextProcessor::with_banner_patterns(
            config.normalization.unicode_form,
            &config.normalization.banner_patterns,
        )?;

        Self::new(embedder, checklists)
            .with_text_processor(text_processor)
            .with_thresholds(config.matching.thresholds())
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Result<Self> {
        self.matcher = FieldMatcher::new(thresholds)?;
        Ok(self)
    }

    pub fn with_text_processor(mut self, text_processor: TextProcessor) -> Self {
        self.text_processor = text_processor;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.matcher.thresholds()
    }

    pub fn normalize_pages(&self, pages: &[Page]) -> Vec<NormalizedPage> {
        pages
            .iter()
            .map(|page| {
                let normalized = self.text_processor.normalize_page(page);
                if normalized.is_excluded() {
                    warn!(
                        "Page {} of {} is empty after normalization; excluded",
                        page.page_number, page.document_id
                    );
                }
                normalized
            })
            .collect()
    }

    /// Pathway of the document as the evaluator would detect it.
    pub fn detect_pathway(&self, pages: &[Page]) -> Pathway {
        self.classifier.classify_pages(&self.normalize_pages(pages))
    }

    /// The ordered field list the evaluator would check for `pathway`.
    pub fn checklist(&self, pathway: Pathway) -> Result<Vec<ChecklistField>> {
        self.checklists.load(pathway)
    }

    /// Evaluate one document against the checklist of its pathway.
    pub fn evaluate(&self, pages: &[Page], pathway_override: Option<Pathway>) -> Result<ComplianceReport> {
        let start_time = Instant::now();

        let normalized = self.normalize_pages(pages);

        let pathway = match pathway_override {
            Some(pathway) => {
                debug!("Pathway overridden: {}", pathway);
                pathway
            }
            None => {
                let detected = self.classifier.classify_pages(&normalized);
                debug!("Pathway detected: {}", detected);
                detected
            }
        };

        let fields = self.checklists.load(pathway)?;
        debug!("Loaded {} checklist fields for {}", fields.len(), pathway);

        let corpus = self.segmenter.segment(&normalized)?;
        debug!("Segmented {} pages into {} units", normalized.len(), corpus.len());

        if corpus.is_empty() {
            info!("No matchable text; all {} fields not found", fields.len());
            let results = fields.iter().map(FieldResult::not_found).collect();
            return Ok(ComplianceReport::new(pathway, results));
        }

        let phrases: Vec<String> = fields
            .iter()
            .flat_map(|f| f.key_phrases.iter())
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect();
        let vectors = EmbeddingCache::new(self.embedder.as_ref()).vectorize_with_phrases(&corpus, &phrases)?;

        let mut results = Vec::with_capacity(fields.len());
        for field in &fields {
            let field_match = self.matcher.match_phrases(&field.key_phrases, &corpus, &vectors)?;

            let pages: BTreeSet<u32> = field_match
                .indices()
                .iter()
                .map(|&i| corpus.origin_pages()[i])
                .collect();

            debug!(
                "Field '{}': found={} after {} phrase(s), {} exact / {} fuzzy / {} semantic hits",
                field.id,
                field_match.is_found(),
                field_match.phrases_tried,
                field_match.hits.exact_hits,
                field_match.hits.fuzzy_hits,
                field_match.hits.semantic_hits
            );

            results.push(FieldResult {
                field_id: field.id.clone(),
                question: field.question.clone(),
                found: field_match.is_found(),
                evidence_pages: pages.into_iter().collect(),
                matched_phrase: field_match.matched_phrase.map(|i| field.key_phrases[i].clone()),
                unit_hits: field_match.indices().len(),
            });
        }

        let report = ComplianceReport::new(pathway, results);
        info!(
            "Evaluated {} fields for {} in {:.2?}: {} found, complete={}",
            report.field_results.len(),
            pathway,
            start_time.elapsed(),
            report.found_count(),
            report.complete
        );

        Ok(report)
    }
}
