//! BOM Table Parser
//!
//! Turns tables returned by the table-extraction collaborator into BOM rows
//! using a manufacturer profile.

use serde::{Deserialize, Serialize};
use tracing::debug;

use exview_models::{BomRow, PageNumber};

use super::profile::{ManufacturerProfile, ProfileRegistry};
use crate::error::ExviewResult;

/// A raw table as extracted from one page: rows of cell text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedTable {
    pub page: PageNumber,
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    pub fn new(page: PageNumber, rows: Vec<Vec<String>>) -> Self {
        Self { page, rows }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map(|c| c.trim()).unwrap_or("")
    }
}

/// BOM rows parsed from a set of tables, with bookkeeping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedBom {
    pub manufacturer: String,
    pub rows: Vec<BomRow>,
    pub tables_seen: usize,
    pub tables_skipped: usize,
    pub header_rows: usize,
    pub incomplete_rows: usize,
    pub warnings: Vec<String>,
}

pub struct TableParser<'a> {
    manufacturer: String,
    profile: &'a ManufacturerProfile,
}

impl<'a> TableParser<'a> {
    /// Fails with `UnsupportedManufacturer` when no profile exists.
    pub fn new(registry: &'a ProfileRegistry, manufacturer: &str) -> ExviewResult<Self> {
        let profile = registry.get(manufacturer)?;
        Ok(Self {
            manufacturer: manufacturer.trim().to_lowercase(),
            profile,
        })
    }

    pub fn parse(&self, tables: &[ExtractedTable]) -> ParsedBom {
        let mut parsed = ParsedBom {
            manufacturer: self.manufacturer.clone(),
            ..Default::default()
        };

        for table in tables {
            parsed.tables_seen += 1;

            if table.rows.is_empty() || table.column_count() < self.profile.min_columns {
                parsed.tables_skipped += 1;
                parsed.warnings.push(format!(
                    "Page {}: table with {} columns skipped (need {})",
                    table.page,
                    table.column_count(),
                    self.profile.min_columns
                ));
                continue;
            }

            for row in &table.rows {
                let reference = ExtractedTable::cell(row, self.profile.ref_column);
                let part_number = ExtractedTable::cell(row, self.profile.part_number_column);
                let description = ExtractedTable::cell(row, self.profile.description_column);

                if reference.is_empty() || part_number.is_empty() {
                    parsed.incomplete_rows += 1;
                    continue;
                }
                if self.profile.is_header_row(reference, part_number, description) {
                    parsed.header_rows += 1;
                    continue;
                }

                parsed.rows.push(BomRow::new(reference, part_number, description, table.page));
            }
        }

        debug!(
            manufacturer = %self.manufacturer,
            rows = parsed.rows.len(),
            tables = parsed.tables_seen,
            skipped = parsed.tables_skipped,
            "Parsed BOM tables"
        );
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_liebherr_columns() {
        let registry = ProfileRegistry::default();
        let parser = TableParser::new(&registry, "Liebherr").unwrap();
        let table = ExtractedTable::new(
            4,
            vec![
                row(&["Remark", "Item", "Part No.", "Qty", "Description"]),
                row(&["", " 12 ", "7426 123", "1", "Door seal "]),
                row(&["", "13", "", "1", "Missing part number"]),
            ],
        );

        let parsed = parser.parse(&[table]);

        assert_eq!(parsed.rows, vec![BomRow::new("12", "7426 123", "Door seal", 4)]);
        assert_eq!(parsed.header_rows, 1);
        assert_eq!(parsed.incomplete_rows, 1);
    }

    #[test]
    fn test_narrow_tables_are_skipped() {
        let registry = ProfileRegistry::default();
        let parser = TableParser::new(&registry, "liebherr").unwrap();
        let table = ExtractedTable::new(2, vec![row(&["1", "2", "3"])]);

        let parsed = parser.parse(&[table]);

        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.tables_skipped, 1);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_viking_columns_and_short_rows() {
        let registry = ProfileRegistry::default();
        let parser = TableParser::new(&registry, "viking").unwrap();
        let table = ExtractedTable::new(
            7,
            vec![
                row(&["ITEM", "PART NO.", "NAME", "QTY"]),
                row(&["A1", "PN-100", "Hinge", "2"]),
                row(&["A2", "PN-200"]),
            ],
        );

        let parsed = parser.parse(&[table]);

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1], BomRow::new("A2", "PN-200", "", 7));
    }

    #[test]
    fn test_unsupported_manufacturer() {
        let registry = ProfileRegistry::default();
        assert!(TableParser::new(&registry, "acme").is_err());
    }
}
