//! Part Reference Linking
//!
//! Post-processing of OCR output from exploded-view diagrams: normalize raw
//! tokens, filter them down to plausible part references, color them against
//! the BOM, link them to BOM rows and report the mismatches.
//!
//! Everything here is synchronous and pure over in-memory data. Pages are
//! independent, so callers may extract them in parallel.

pub mod normalizer;
pub mod wordfreq;
pub mod filter;
pub mod index;
pub mod extractor;
pub mod linker;
pub mod anomaly;
pub mod pipeline;

pub use normalizer::{is_numeric, normalize_token, strip_punctuation};
pub use wordfreq::{CommonWordOracle, EnglishCorpus, WordList, ZipfTable};
pub use filter::{Candidate, CandidateFilter, FilterSettings, Rejection};
pub use index::BomIndex;
pub use extractor::{sort_boxes, BoxExtractor};
pub use linker::PartLinker;
pub use anomaly::{detected_tokens_by_page, AnomalyDetector};
pub use pipeline::{LinkingPipeline, LinkingReport};
