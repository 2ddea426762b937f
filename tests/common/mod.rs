//! Deterministic stand-ins for the embedding capability and checklist source

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use submission_checker::checklist::{ChecklistField, ChecklistSource};
use submission_checker::error::{CheckerError, Result};
use submission_checker::processing::embeddings::Embedder;
use submission_checker::processing::field_matcher::MatchThresholds;
use submission_checker::{ChecklistEvaluator, Page, Pathway};

/// Gives every distinct text its own axis: only identical strings are semantically close.
#[derive(Default)]
pub struct OneHotEmbedder {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl OneHotEmbedder {
    pub const DIMENSION: usize = 512;

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for OneHotEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut seen = self.seen.lock().unwrap();
        let axis = match seen.iter().position(|s| s == text) {
            Some(axis) => axis,
            None => {
                seen.push(text.to_string());
                seen.len() - 1
            }
        };
        assert!(axis < Self::DIMENSION, "too many distinct texts for the stub");

        let mut v = vec![0.0; Self::DIMENSION];
        v[axis] = 1.0;
        Ok(v)
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Two-axis bag of words: sensitivity vocabulary on one axis, everything else
/// weighted down on the other.
pub struct ConceptEmbedder;

const SENSITIVITY_WORDS: [&str; 6] = ["analytical", "sensitivity", "limit", "quantitation", "detection", "blank"];

impl Embedder for ConceptEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0_f32; 2];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if SENSITIVITY_WORDS.contains(&word.to_lowercase().as_str()) {
                v[0] += 1.0;
            } else {
                v[1] += 0.1;
            }
        }
        Ok(v)
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn encode(&self, _text: &str) -> Result<Vec<f32>> {
        Err(CheckerError::embedding("model weights missing"))
    }
}

/// Serves the same fields for every pathway and records the last pathway requested.
pub struct FixedChecklist {
    fields: Vec<ChecklistField>,
    pub requested: Arc<Mutex<Option<Pathway>>>,
}

impl FixedChecklist {
    pub fn new(fields: Vec<ChecklistField>) -> Self {
        Self {
            fields,
            requested: Arc::new(Mutex::new(None)),
        }
    }
}

impl ChecklistSource for FixedChecklist {
    fn load(&self, pathway: Pathway) -> Result<Vec<ChecklistField>> {
        *self.requested.lock().unwrap() = Some(pathway);
        Ok(self.fields.clone())
    }
}

pub fn field(id: &str, phrases: &[&str]) -> ChecklistField {
    ChecklistField::new(id, &format!("Is {} present?", id.replace('_', " ")), phrases)
}

pub fn pages(texts: &[&str]) -> Vec<Page> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Page::new("test-doc", (i + 1) as u32, *text))
        .collect()
}

pub fn thresholds(fuzzy: f64, semantic: f32) -> MatchThresholds {
    MatchThresholds { fuzzy, semantic }
}

pub fn evaluator(
    embedder: impl Embedder + 'static,
    fields: Vec<ChecklistField>,
    thresholds: MatchThresholds,
) -> ChecklistEvaluator {
    ChecklistEvaluator::new(Box::new(embedder), Box::new(FixedChecklist::new(fields)))
        .with_thresholds(thresholds)
        .unwrap()
}
