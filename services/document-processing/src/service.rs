//! Linking Service
//!
//! Orchestrates BOM table parsing, diagram OCR and part reference linking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use exview_models::{BomRow, CandidateBox, PageNumber, PageText, Word};
use exview_utils::{
    AppConfig, BomIndex, BomValidator, ExtractedTable, ExviewError, ExviewResult, LinkingPipeline, LinkingReport,
    ParsedBom, ProfileRegistry, TableParser, ValidationResult,
};

use crate::table_client::TableExtractionClient;
use crate::vision_client::VisionClient;

/// One uploaded page image.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page: PageNumber,
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct BomReport {
    pub run_id: Uuid,
    #[serde(flatten)]
    pub parsed: ParsedBom,
    pub validation: ValidationResult,
}

#[derive(Debug, Serialize)]
pub struct LinkRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: LinkingReport,
}

#[derive(Clone)]
pub struct LinkingService {
    pipeline: Arc<LinkingPipeline>,
    profiles: Arc<ProfileRegistry>,
    vision: Arc<VisionClient>,
    tables: Arc<TableExtractionClient>,
    validator: Arc<BomValidator>,
}

impl LinkingService {
    pub fn new(
        pipeline: LinkingPipeline,
        profiles: ProfileRegistry,
        vision: VisionClient,
        tables: TableExtractionClient,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            profiles: Arc::new(profiles),
            vision: Arc::new(vision),
            tables: Arc::new(tables),
            validator: Arc::new(BomValidator::default()),
        }
    }

    pub fn from_config(config: &AppConfig) -> ExviewResult<Self> {
        Ok(Self::new(
            LinkingPipeline::from_config(&config.extraction)?,
            ProfileRegistry::new(&config.manufacturers)?,
            VisionClient::new(&config.ocr)?,
            TableExtractionClient::new(&config.table_extraction)?,
        ))
    }

    pub fn manufacturers(&self) -> Vec<String> {
        self.profiles.ids()
    }

    pub fn parse_bom(&self, manufacturer: &str, tables: &[ExtractedTable]) -> ExviewResult<BomReport> {
        let parsed = TableParser::new(&self.profiles, manufacturer)?.parse(tables);
        let validation = self.validator.validate(&parsed.rows);

        info!(
            manufacturer = %parsed.manufacturer,
            rows = parsed.rows.len(),
            tables = parsed.tables_seen,
            "Parsed BOM tables"
        );

        Ok(BomReport {
            run_id: Uuid::new_v4(),
            parsed,
            validation,
        })
    }

    /// Table extraction per page, then parsing. A page whose extraction fails
    /// contributes a warning instead of failing the whole BOM.
    pub async fn extract_bom(&self, manufacturer: &str, pages: Vec<PageImage>) -> ExviewResult<BomReport> {
        // Reject unknown manufacturers before spending collaborator calls.
        self.profiles.get(manufacturer)?;

        let mut tables = Vec::new();
        let mut page_warnings = Vec::new();

        for image in pages {
            let page = image.page;
            match self.tables.extract_tables(page, image.data, image.file_name).await {
                Ok(found) => tables.extend(found),
                Err(e) => {
                    warn!(page, error = %e, "Table extraction failed for page");
                    page_warnings.push(format!("Page {}: {}", page, e));
                }
            }
        }

        let mut report = self.parse_bom(manufacturer, &tables)?;
        page_warnings.append(&mut report.parsed.warnings);
        report.parsed.warnings = page_warnings;
        Ok(report)
    }

    pub async fn ocr_page(&self, image_data: &[u8]) -> ExviewResult<PageText> {
        self.vision.detect_text(image_data).await
    }

    pub fn extract_boxes(&self, words: &[Word], bom: &[BomRow]) -> Vec<CandidateBox> {
        self.pipeline.extract_page(words, &BomIndex::from_rows(bom))
    }

    /// Pages are extracted on the blocking pool in parallel, then linked and
    /// checked for anomalies together.
    pub async fn link(&self, pages: BTreeMap<PageNumber, Vec<Word>>, bom: Vec<BomRow>) -> ExviewResult<LinkRun> {
        let index = Arc::new(BomIndex::new(bom));
        let mut tasks = JoinSet::new();

        for (page, words) in pages {
            let pipeline = Arc::clone(&self.pipeline);
            let index = Arc::clone(&index);
            tasks.spawn_blocking(move || (page, pipeline.extract_page(&words, &index)));
        }

        let mut boxes = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (page, page_boxes) =
                joined.map_err(|e| ExviewError::internal(format!("page extraction task failed: {}", e)))?;
            boxes.insert(page, page_boxes);
        }

        Ok(LinkRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            report: LinkingPipeline::assemble(boxes, &index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exview_models::{AnomalyRow, BoxColor};

    fn service() -> LinkingService {
        LinkingService::from_config(&AppConfig::default()).unwrap()
    }

    fn table(page: PageNumber, rows: &[&[&str]]) -> ExtractedTable {
        ExtractedTable::new(page, rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect())
    }

    #[test]
    fn test_parse_bom_validates_rows() {
        let tables = vec![table(
            1,
            &[&["Item", "Part No.", "Name"], &["1", "W100", "Door"], &["1", "W101", ""]],
        )];

        let report = service().parse_bom("Viking", &tables).unwrap();

        assert_eq!(report.parsed.manufacturer, "viking");
        assert_eq!(report.parsed.rows.len(), 2);
        assert_eq!(report.validation.summary.duplicate_references, 1);
    }

    #[tokio::test]
    async fn test_extract_bom_rejects_unknown_manufacturer() {
        let err = service().extract_bom("acme", Vec::new()).await.unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_MANUFACTURER");
    }

    #[tokio::test]
    async fn test_extract_bom_keeps_going_when_a_page_fails() {
        let pages = vec![PageImage {
            page: 3,
            file_name: "page-3.png".to_string(),
            data: vec![0x89, 0x50],
        }];

        // No API key is configured, so the page fails without a network call.
        let report = service().extract_bom("liebherr", pages).await.unwrap();

        assert!(report.parsed.rows.is_empty());
        assert_eq!(report.parsed.warnings.len(), 1);
        assert!(report.parsed.warnings[0].starts_with("Page 3:"));
    }

    #[tokio::test]
    async fn test_link_across_pages() {
        let mut pages = BTreeMap::new();
        pages.insert(1, vec![Word::new("12", 10.0, 10.0, 8.0, 8.0), Word::new("1", 300.0, 900.0, 6.0, 8.0)]);
        pages.insert(
            2,
            vec![
                Word::new("77", 40.0, 10.0, 8.0, 8.0),
                Word::new("12", 60.0, 10.0, 8.0, 8.0),
                Word::new("2", 300.0, 900.0, 6.0, 8.0),
            ],
        );
        let bom = vec![BomRow::new("12", "PN-12", "Shelf", 1), BomRow::new("34", "PN-34", "Lid", 1)];

        let run = service().link(pages, bom).await.unwrap();

        assert_eq!(run.report.boxes.len(), 2);
        assert_eq!(run.report.linked[&1].len(), 1);
        assert_eq!(run.report.linked[&2].len(), 1);
        assert_eq!(run.report.boxes[&2][0].token, "12");
        assert_eq!(run.report.boxes[&2][1].color, BoxColor::Red);
        assert_eq!(
            run.report.anomalies,
            vec![
                AnomalyRow::not_in_diagram(&BomRow::new("34", "PN-34", "Lid", 1)),
                AnomalyRow::not_in_bom("77"),
            ]
        );
    }
}
