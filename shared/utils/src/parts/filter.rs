//! Candidate Filter
//!
//! Decides whether an OCR token is plausibly a part reference. Three inputs
//! drive the decision: the token-shape grammar on the raw token, a stopword set
//! and English-word oracle for alphanumeric tokens, and the page-number rule
//! that drops the bottom-most short number on a page.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use exview_models::Word;

use super::normalizer::is_numeric;
use super::wordfreq::CommonWordOracle;
use crate::config::ExtractionConfig;
use crate::error::ExviewResult;

#[derive(Debug, Clone)]
pub struct FilterSettings {
    /// Upper-case stopwords; compared against the raw token.
    pub stopwords: HashSet<String>,
    pub max_token_len: usize,
    pub max_numeric_len: usize,
    pub min_alnum_len: usize,
    pub max_alnum_len: usize,
    pub page_number_max_digits: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for FilterSettings {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            stopwords: config.stopwords.iter().map(|s| s.to_uppercase()).collect(),
            max_token_len: config.max_token_len,
            max_numeric_len: config.max_numeric_len,
            min_alnum_len: config.min_alnum_len,
            max_alnum_len: config.max_alnum_len,
            page_number_max_digits: config.page_number_max_digits,
        }
    }
}

/// Why a shape-valid candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NumericLength,
    Stopword,
    CommonWord,
    AlnumLength,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NumericLength => "numeric length",
            Self::Stopword => "stopword",
            Self::CommonWord => "english word",
            Self::AlnumLength => "alphanumeric length",
        };
        f.write_str(reason)
    }
}

/// A shape-valid token still attached to its source word.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Punctuation-stripped text, before normalization.
    pub raw: &'a str,
    pub word: &'a Word,
}

#[derive(Clone)]
pub struct CandidateFilter {
    settings: FilterSettings,
    shape: Regex,
    page_number: Regex,
    oracle: Arc<dyn CommonWordOracle>,
}

impl fmt::Debug for CandidateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateFilter")
            .field("settings", &self.settings)
            .field("shape", &self.shape.as_str())
            .finish_non_exhaustive()
    }
}

impl CandidateFilter {
    pub fn new(settings: FilterSettings, oracle: Arc<dyn CommonWordOracle>) -> ExviewResult<Self> {
        let shape = Regex::new(&format!(r"^[A-Za-z0-9]{{1,{}}}$", settings.max_token_len))?;
        let page_number = Regex::new(&format!(r"^[0-9]{{1,{}}}$", settings.page_number_max_digits))?;

        Ok(Self {
            settings,
            shape,
            page_number,
            oracle,
        })
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Token-shape grammar: 1..=max_token_len ASCII alphanumerics.
    pub fn is_shape_valid(&self, raw: &str) -> bool {
        self.shape.is_match(raw)
    }

    pub fn looks_like_page_number(&self, raw: &str) -> bool {
        self.page_number.is_match(raw)
    }

    /// Index of the page-number candidate: the short number with the largest y.
    /// Ties keep the first one seen.
    pub fn page_number_index(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        let mut lowest: Option<(usize, f64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            if !self.looks_like_page_number(candidate.raw) {
                continue;
            }
            match lowest {
                Some((_, y)) if candidate.word.y <= y => {}
                _ => lowest = Some((idx, candidate.word.y)),
            }
        }

        lowest.map(|(idx, _)| idx)
    }

    /// Classify a candidate by its raw and normalized forms.
    pub fn check(&self, raw: &str, token: &str) -> Result<(), Rejection> {
        let len = token.chars().count();

        if is_numeric(token) {
            // Numbers skip the word checks.
            if len == 0 || len > self.settings.max_numeric_len {
                return Err(Rejection::NumericLength);
            }
            return Ok(());
        }

        let raw_upper = raw.to_uppercase();
        if self.settings.stopwords.contains(&raw_upper) {
            return Err(Rejection::Stopword);
        }
        if self.oracle.is_common_word(&raw.to_lowercase()) {
            return Err(Rejection::CommonWord);
        }
        if len < self.settings.min_alnum_len || len > self.settings.max_alnum_len {
            return Err(Rejection::AlnumLength);
        }
        Ok(())
    }

    pub fn accepts(&self, raw: &str, token: &str) -> bool {
        self.check(raw, token).is_ok()
    }
}
