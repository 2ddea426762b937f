//! Exact, fuzzy and semantic phrase matching against a document's units

use crate::error::{CheckerError, Result};
use crate::processing::embeddings::{dot, DocumentVectors};
use crate::processing::segmenter::{canonicalize, UnitCorpus};
use serde::{Deserialize, Serialize};
use strsim::generic_levenshtein;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 85.0;
pub const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    /// Minimum partial similarity score, 0-100.
    pub fuzzy: f64,
    /// Minimum cosine similarity, -1.0 to 1.0.
    pub semantic: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            fuzzy: DEFAULT_FUZZY_THRESHOLD,
            semantic: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.fuzzy) {
            return Err(CheckerError::Configuration(format!(
                "Fuzzy threshold must be within 0-100, got {}",
                self.fuzzy
            )));
        }
        if !(-1.0..=1.0).contains(&self.semantic) {
            return Err(CheckerError::Configuration(format!(
                "Semantic threshold must be within -1.0-1.0, got {}",
                self.semantic
            )));
        }
        Ok(())
    }
}

/// Hits for one phrase. `indices` is the sorted, deduplicated union of all signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseMatch {
    pub indices: Vec<usize>,
    pub exact_hits: usize,
    pub fuzzy_hits: usize,
    pub semantic_hits: usize,
}

impl PhraseMatch {
    pub fn is_found(&self) -> bool {
        !self.indices.is_empty()
    }
}

/// Outcome of an ordered phrase list: the first phrase with any hit, and its hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMatch {
    /// Position of the phrase that matched, if any.
    pub matched_phrase: Option<usize>,
    pub phrases_tried: usize,
    pub hits: PhraseMatch,
}

impl FieldMatch {
    pub fn is_found(&self) -> bool {
        self.matched_phrase.is_some()
    }

    pub fn indices(&self) -> &[usize] {
        &self.hits.indices
    }
}

/// Query-side forms, computed once per phrase.
struct Query<'a> {
    lowered: String,
    canonical: String,
    vector: &'a [f32],
}

pub struct FieldMatcher {
    thresholds: MatchThresholds,
}

impl Default for FieldMatcher {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
        }
    }
}

impl FieldMatcher {
    pub fn new(thresholds: MatchThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// Match a single phrase.
    pub fn match_phrase(&self, phrase: &str, corpus: &UnitCorpus, vectors: &DocumentVectors) -> Result<PhraseMatch> {
        self.match_phrases(std::slice::from_ref(&phrase), corpus, vectors)
            .map(|field| field.hits)
    }

    /// Try phrases in declared order and stop at the first one with a non-empty hit set.
    pub fn match_phrases<P: AsRef<str>>(
        &self,
        phrases: &[P],
        corpus: &UnitCorpus,
        vectors: &DocumentVectors,
    ) -> Result<FieldMatch> {
        if !corpus.is_empty() && vectors.len() != corpus.len() {
            return Err(CheckerError::InvalidInput(format!(
                "Corpus has {} units but {} vectors",
                corpus.len(),
                vectors.len()
            )));
        }

        let mut field = FieldMatch::default();
        for (position, phrase) in phrases.iter().enumerate() {
            field.phrases_tried = position + 1;
            let hits = self.score_phrase(phrase.as_ref(), corpus, vectors)?;
            if hits.is_found() {
                field.matched_phrase = Some(position);
                field.hits = hits;
                break;
            }
        }
        Ok(field)
    }

    fn score_phrase(&self, phrase: &str, corpus: &UnitCorpus, vectors: &DocumentVectors) -> Result<PhraseMatch> {
        if phrase.trim().is_empty() || corpus.is_empty() {
            return Ok(PhraseMatch::default());
        }

        let vector = vectors.phrase_vector(phrase).ok_or_else(|| {
            CheckerError::InvalidInput(format!("Phrase '{}' was not vectorized with the document", phrase))
        })?;

        let query = Query {
            lowered: phrase.to_lowercase(),
            canonical: canonicalize(phrase),
            vector,
        };

        let mut result = PhraseMatch::default();
        for index in 0..corpus.len() {
            let exact = corpus.lowered(index).contains(&query.lowered);
            let fuzzy = !query.canonical.is_empty()
                && partial_ratio(&query.canonical, corpus.canonical(index)) >= self.thresholds.fuzzy;
            let semantic = vectors
                .unit_vector(index)
                .is_some_and(|unit| dot(query.vector, unit) >= self.thresholds.semantic);

            result.exact_hits += usize::from(exact);
            result.fuzzy_hits += usize::from(fuzzy);
            result.semantic_hits += usize::from(semantic);

            if exact || fuzzy || semantic {
                result.indices.push(index);
            }
        }

        Ok(result)
    }
}

/// Char slice view that `strsim::generic_levenshtein` can iterate by reference.
struct CharSlice<'s>(&'s [char]);

impl<'a, 's> IntoIterator for &'a CharSlice<'s> {
    type Item = &'s char;
    type IntoIter = std::slice::Iter<'s, char>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Normalized Levenshtein similarity (0-100) of two char slices.
fn slice_ratio(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 100.0;
    }
    let distance = generic_levenshtein(&CharSlice(a), &CharSlice(b));
    (1.0 - distance as f64 / longest as f64) * 100.0
}

/// Best similarity (0-100) of the shorter string against any same-length window
/// of the longer one, including windows cut off at either edge.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return slice_ratio(short, long);
    }
    if long.windows(short.len()).any(|window| window == short.as_slice()) {
        return 100.0;
    }

    let n = short.len();
    let mut best = 0.0_f64;

    for window in long.windows(n) {
        best = best.max(slice_ratio(short, window));
    }

    // An edge window of `len` chars scores at most len / n
    for len in (1..n).rev() {
        if (len as f64 / n as f64) * 100.0 <= best {
            break;
        }
        best = best.max(slice_ratio(short, &long[..len]));
        best = best.max(slice_ratio(short, &long[long.len() - len..]));
    }

    best
}
