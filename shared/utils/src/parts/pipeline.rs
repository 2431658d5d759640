//! Linking Pipeline
//!
//! Pages of OCR words plus a BOM table in; candidate boxes, per-page linked
//! tables and the anomaly table out.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use exview_models::{AnomalyRow, BomRow, CandidateBox, LinkedRow, PageNumber, Word};

use super::anomaly::{detected_tokens_by_page, AnomalyDetector};
use super::extractor::BoxExtractor;
use super::filter::{CandidateFilter, FilterSettings};
use super::index::BomIndex;
use super::linker::PartLinker;
use super::wordfreq::{CommonWordOracle, EnglishCorpus, ZipfTable};
use crate::config::ExtractionConfig;
use crate::error::ExviewResult;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkingReport {
    pub boxes: BTreeMap<PageNumber, Vec<CandidateBox>>,
    pub linked: BTreeMap<PageNumber, Vec<LinkedRow>>,
    pub anomalies: Vec<AnomalyRow>,
}

#[derive(Debug, Clone)]
pub struct LinkingPipeline {
    extractor: BoxExtractor,
}

impl LinkingPipeline {
    pub fn new(extractor: BoxExtractor) -> Self {
        Self { extractor }
    }

    pub fn from_config(config: &ExtractionConfig) -> ExviewResult<Self> {
        config.validate()?;

        let threshold = config.english_zipf_threshold;
        let oracle: Arc<dyn CommonWordOracle> = match &config.word_frequency_path {
            Some(path) => {
                let table = ZipfTable::from_path(path, threshold)?;
                info!(path = %path, words = table.len(), threshold, "Loaded word frequency table");
                Arc::new(table)
            }
            None => {
                info!(threshold, "Using wordfreq English corpus");
                Arc::new(EnglishCorpus::large(threshold)?)
            }
        };

        Self::with_oracle(config, oracle)
    }

    pub fn with_oracle(config: &ExtractionConfig, oracle: Arc<dyn CommonWordOracle>) -> ExviewResult<Self> {
        let filter = CandidateFilter::new(FilterSettings::from(config), oracle)?;
        Ok(Self::new(BoxExtractor::new(filter)))
    }

    pub fn extractor(&self) -> &BoxExtractor {
        &self.extractor
    }

    /// Candidate boxes for a single page, colored against `index`.
    pub fn extract_page(&self, words: &[Word], index: &BomIndex) -> Vec<CandidateBox> {
        self.extractor.extract(words, index.references())
    }

    pub fn run(&self, pages: &BTreeMap<PageNumber, Vec<Word>>, bom: &[BomRow]) -> LinkingReport {
        let index = BomIndex::from_rows(bom);
        self.run_indexed(pages, &index)
    }

    pub fn run_indexed(&self, pages: &BTreeMap<PageNumber, Vec<Word>>, index: &BomIndex) -> LinkingReport {
        let boxes: BTreeMap<PageNumber, Vec<CandidateBox>> = pages
            .iter()
            .map(|(&page, words)| (page, self.extract_page(words, index)))
            .collect();

        Self::assemble(boxes, index)
    }

    /// Link and flag boxes that were already extracted, possibly page by page elsewhere.
    pub fn assemble(boxes: BTreeMap<PageNumber, Vec<CandidateBox>>, index: &BomIndex) -> LinkingReport {
        let linked = PartLinker::new(index).link_by_page(&boxes);
        let anomalies = AnomalyDetector::new(index).detect(&detected_tokens_by_page(&boxes));

        info!(
            pages = boxes.len(),
            bom_rows = index.len(),
            boxes = boxes.values().map(Vec::len).sum::<usize>(),
            linked = linked.values().map(Vec::len).sum::<usize>(),
            anomalies = anomalies.len(),
            "Linked diagram pages to BOM"
        );

        LinkingReport {
            boxes,
            linked,
            anomalies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::wordfreq::WordList;

    fn pipeline() -> LinkingPipeline {
        LinkingPipeline::with_oracle(&ExtractionConfig::default(), Arc::new(WordList::new(["hello"]))).unwrap()
    }

    #[test]
    fn test_run_links_and_flags() {
        let mut pages = BTreeMap::new();
        pages.insert(
            2,
            vec![
                Word::new("12", 100.0, 100.0, 10.0, 10.0),
                Word::new("99", 200.0, 100.0, 10.0, 10.0),
                Word::new("3", 500.0, 990.0, 10.0, 10.0),
            ],
        );
        let bom = vec![BomRow::new("12", "PN-12", "Shelf", 1), BomRow::new("34", "PN-34", "Lid", 1)];

        let report = pipeline().run(&pages, &bom);

        assert_eq!(report.boxes[&2].len(), 2);
        assert_eq!(report.linked[&2].len(), 1);
        assert_eq!(report.linked[&2][0].part_number, "PN-12");
        assert_eq!(report.anomalies.len(), 2);
    }

    #[test]
    fn test_degenerate_inputs_yield_empty_outputs() {
        let mut pages = BTreeMap::new();
        pages.insert(1, Vec::new());

        let report = pipeline().run(&pages, &[]);

        assert!(report.boxes[&1].is_empty());
        assert!(report.linked[&1].is_empty());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_from_config_uses_english_corpus() {
        let pipeline = LinkingPipeline::from_config(&ExtractionConfig::default()).unwrap();
        assert!(pipeline.extractor().filter().accepts("N01", "N01"));
        assert!(!pipeline.extractor().filter().accepts("hello", "HELLO"));
        assert!(!pipeline.extractor().filter().accepts("bracket", "BRACKET"));
    }
}
