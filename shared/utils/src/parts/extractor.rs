//! Box Extractor
//!
//! Runs the normalizer and candidate filter over every OCR word on a page and
//! produces the colored candidate boxes drawn over the diagram.

use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, trace};

use exview_models::{BoxColor, CandidateBox, Word};

use super::filter::{Candidate, CandidateFilter};
use super::normalizer::{is_numeric, normalize_token, strip_punctuation};

#[derive(Debug, Clone)]
pub struct BoxExtractor {
    filter: CandidateFilter,
}

impl BoxExtractor {
    pub fn new(filter: CandidateFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &CandidateFilter {
        &self.filter
    }

    /// Words whose punctuation-stripped text passes the shape grammar, in page order.
    pub fn shape_candidates<'a>(&self, words: &'a [Word]) -> Vec<Candidate<'a>> {
        words
            .iter()
            .filter_map(|word| {
                let raw = strip_punctuation(word.text.trim());
                if raw.is_empty() || !self.filter.is_shape_valid(raw) {
                    return None;
                }
                Some(Candidate { raw, word })
            })
            .collect()
    }

    /// Extract sorted candidate boxes for one page.
    ///
    /// `bom_refs` holds upper-cased BOM references and decides the box color.
    pub fn extract(&self, words: &[Word], bom_refs: &HashSet<String>) -> Vec<CandidateBox> {
        let candidates = self.shape_candidates(words);
        let page_number = self.filter.page_number_index(&candidates);

        if let Some(idx) = page_number {
            debug!(token = candidates[idx].raw, y = candidates[idx].word.y, "Excluding page number");
        }

        let mut boxes: Vec<CandidateBox> = candidates
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != page_number)
            .filter_map(|(_, candidate)| {
                let raw = candidate.raw.to_uppercase();
                let token = normalize_token(&raw)?;

                if let Err(reason) = self.filter.check(&raw, &token) {
                    trace!(raw = %raw, token = %token, %reason, "Rejected candidate");
                    return None;
                }

                let color = BoxColor::from_match(bom_refs.contains(&token));
                Some(CandidateBox::from_word(candidate.word, token, color))
            })
            .collect();

        sort_boxes(&mut boxes);

        debug!(
            words = words.len(),
            candidates = candidates.len(),
            boxes = boxes.len(),
            "Extracted candidate boxes"
        );
        boxes
    }
}

/// Numeric tokens first by value, then the rest lexically. Stable.
pub fn sort_boxes(boxes: &mut [CandidateBox]) {
    boxes.sort_by(|a, b| compare_tokens(&a.token, &b.token));
}

pub fn compare_tokens(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => numeric_value(a).cmp(&numeric_value(b)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn numeric_value(token: &str) -> u64 {
    token.parse().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::filter::FilterSettings;
    use crate::parts::wordfreq::WordList;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn extractor() -> BoxExtractor {
        let oracle = Arc::new(WordList::new(["hello", "view"]));
        BoxExtractor::new(CandidateFilter::new(FilterSettings::default(), oracle).unwrap())
    }

    fn refs(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn tokens(boxes: &[CandidateBox]) -> Vec<&str> {
        boxes.iter().map(|b| b.token.as_str()).collect()
    }

    #[test]
    fn test_page_number_is_excluded() {
        let words = vec![
            Word::new("7", 10.0, 100.0, 5.0, 5.0),
            Word::new("42", 10.0, 500.0, 5.0, 5.0),
            Word::new("ABC1", 10.0, 10.0, 5.0, 5.0),
        ];

        let boxes = extractor().extract(&words, &refs(&[]));

        assert_eq!(tokens(&boxes), vec!["7", "ABC1"]);
    }

    #[test]
    fn test_color_assignment() {
        let words = vec![
            Word::new("12", 0.0, 10.0, 5.0, 5.0),
            Word::new("99", 0.0, 20.0, 5.0, 5.0),
            Word::new("AB1", 0.0, 30.0, 5.0, 5.0),
            Word::new("5", 0.0, 900.0, 5.0, 5.0),
        ];

        let boxes = extractor().extract(&words, &refs(&["12", "AB1"]));

        assert_eq!(tokens(&boxes), vec!["12", "99", "AB1"]);
        assert_eq!(boxes[0].color, BoxColor::Green);
        assert_eq!(boxes[1].color, BoxColor::Red);
        assert_eq!(boxes[2].color, BoxColor::Green);
    }

    #[test]
    fn test_sort_order() {
        let word = Word::new("x", 0.0, 0.0, 0.0, 0.0);
        let mut boxes: Vec<CandidateBox> = ["B2", "12", "A1", "3"]
            .iter()
            .map(|t| CandidateBox::from_word(&word, t.to_string(), BoxColor::Red))
            .collect();

        sort_boxes(&mut boxes);

        assert_eq!(tokens(&boxes), vec!["3", "12", "A1", "B2"]);
    }

    #[test]
    fn test_punctuation_and_shape() {
        let words = vec![
            Word::new("(AB12).", 0.0, 0.0, 1.0, 1.0),
            Word::new("AB-12", 0.0, 0.0, 1.0, 1.0),
            Word::new("ABCDEFGHI", 0.0, 0.0, 1.0, 1.0),
            Word::new("---", 0.0, 0.0, 1.0, 1.0),
            Word::new("", 0.0, 0.0, 1.0, 1.0),
        ];

        let boxes = extractor().extract(&words, &refs(&[]));

        assert_eq!(tokens(&boxes), vec!["AB12"]);
    }

    #[test]
    fn test_page_number_chosen_before_normalization() {
        // "00" is the lowest short number; it is excluded even though it would
        // normalize to nothing, so "8" survives.
        let words = vec![
            Word::new("8", 0.0, 100.0, 1.0, 1.0),
            Word::new("00", 0.0, 700.0, 1.0, 1.0),
        ];

        let boxes = extractor().extract(&words, &refs(&[]));

        assert_eq!(tokens(&boxes), vec!["8"]);
    }

    #[test]
    fn test_empty_page() {
        assert!(extractor().extract(&[], &refs(&["1"])).is_empty());
    }

    proptest! {
        /// Every emitted token is upper case and passes the shape grammar.
        #[test]
        fn prop_boxes_satisfy_token_invariant(
            texts in prop::collection::vec("[A-Za-z0-9().-]{0,10}", 0..20)
        ) {
            let extractor = extractor();
            let words: Vec<Word> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| Word::new(t.clone(), 0.0, i as f64, 1.0, 1.0))
                .collect();

            for candidate in extractor.extract(&words, &HashSet::new()) {
                prop_assert_eq!(candidate.token.to_uppercase(), candidate.token.clone());
                prop_assert!(extractor.filter().is_shape_valid(&candidate.token));
            }
        }

        /// Output is ordered numbers-first, ascending within each group.
        #[test]
        fn prop_output_is_sorted(
            texts in prop::collection::vec("[A-Z0-9]{1,6}", 0..20)
        ) {
            let words: Vec<Word> = texts
                .iter()
                .map(|t| Word::new(t.clone(), 0.0, 0.0, 1.0, 1.0))
                .collect();
            let boxes = extractor().extract(&words, &HashSet::new());

            for pair in boxes.windows(2) {
                prop_assert_ne!(compare_tokens(&pair[0].token, &pair[1].token), Ordering::Greater);
            }
        }
    }
}
