//! English word-frequency oracle.
//!
//! Part codes that happen to spell a common English word ("FAN", "HELLO") are
//! OCR false positives on exploded-view sheets. The filter asks an oracle
//! whether a token is such a word; the oracle is a trait so tests and callers
//! can swap in their own word lists.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::warn;
use wordfreq::WordFreq;
use wordfreq_model::{load_wordfreq, ModelKind};

use crate::error::{ExviewError, ExviewResult};

static LARGE_ENGLISH: OnceLock<Arc<WordFreq>> = OnceLock::new();

/// Capability answering "is this token a common English word?".
pub trait CommonWordOracle: Send + Sync {
    fn is_common_word(&self, token: &str) -> bool;
}

fn contains_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// The wordfreq English corpus on the Zipf scale.
#[derive(Clone)]
pub struct EnglishCorpus {
    model: Arc<WordFreq>,
    threshold: f64,
}

impl EnglishCorpus {
    /// The large English model. It is loaded once per process and shared.
    pub fn large(threshold: f64) -> ExviewResult<Self> {
        let model = match LARGE_ENGLISH.get() {
            Some(model) => Arc::clone(model),
            None => {
                let loaded = load_wordfreq(ModelKind::LargeEn).map_err(|e| {
                    ExviewError::configuration(format!("failed to load English word frequencies: {}", e))
                })?;
                Arc::clone(LARGE_ENGLISH.get_or_init(|| Arc::new(loaded)))
            }
        };
        Ok(Self { model, threshold })
    }

    pub fn zipf_frequency(&self, word: &str) -> f64 {
        f64::from(self.model.zipf_frequency(&word.to_lowercase()))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl fmt::Debug for EnglishCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnglishCorpus")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl CommonWordOracle for EnglishCorpus {
    fn is_common_word(&self, token: &str) -> bool {
        !contains_digit(token) && self.zipf_frequency(token) >= self.threshold
    }
}

/// Zipf-scale frequency table (log10 occurrences per billion words) read
/// from a `word,zipf` CSV.
#[derive(Debug, Clone)]
pub struct ZipfTable {
    frequencies: HashMap<String, f64>,
    threshold: f64,
}

#[derive(Debug, Deserialize)]
struct ZipfRecord {
    word: String,
    zipf: f64,
}

impl ZipfTable {
    pub fn new(threshold: f64) -> Self {
        Self {
            frequencies: HashMap::new(),
            threshold,
        }
    }

    pub fn from_path(path: impl AsRef<Path>, threshold: f64) -> ExviewResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, threshold)
    }

    /// Read a `word,zipf` CSV with a header row. Malformed records are skipped.
    pub fn from_reader<R: Read>(reader: R, threshold: f64) -> ExviewResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::new(threshold);
        let mut skipped = 0usize;

        for record in reader.deserialize::<ZipfRecord>() {
            match record {
                Ok(record) => table.insert(&record.word, record.zipf),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, "Skipped malformed word frequency records");
        }
        Ok(table)
    }

    pub fn insert(&mut self, word: &str, zipf: f64) {
        self.frequencies.insert(word.to_lowercase(), zipf);
    }

    /// Frequency of a word, 0.0 when unknown.
    pub fn zipf_frequency(&self, word: &str) -> f64 {
        self.frequencies
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl CommonWordOracle for ZipfTable {
    fn is_common_word(&self, token: &str) -> bool {
        // Anything with a digit is a code, never a word.
        !contains_digit(token) && self.zipf_frequency(token) >= self.threshold
    }
}

/// Fixed word list; every listed word counts as common.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }
}

impl CommonWordOracle for WordList {
    fn is_common_word(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }
}
