//! Bill of materials domain models.
//!
//! A BOM row is produced by the table-extraction collaborator and is immutable
//! from the moment it is parsed. Field names serialize in the upper-case column
//! form used by the review tables (`REF`, `PART_NUMBER`, ...).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Page number within the source PDF (1-based).
pub type PageNumber = u32;

/// A single row of an extracted BOM table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct BomRow {
    /// Reference label as printed in the table. Not guaranteed unique.
    #[serde(rename = "REF")]
    #[validate(length(min = 1, max = 64, message = "REF must be between 1 and 64 characters"))]
    pub reference: String,
    #[serde(rename = "PART_NUMBER")]
    #[validate(length(min = 1, max = 128, message = "PART_NUMBER must be between 1 and 128 characters"))]
    pub part_number: String,
    #[serde(rename = "DESCRIPTION", default)]
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(rename = "PAGE", default)]
    pub page: PageNumber,
}

impl BomRow {
    pub fn new(
        reference: impl Into<String>,
        part_number: impl Into<String>,
        description: impl Into<String>,
        page: PageNumber,
    ) -> Self {
        Self {
            reference: reference.into(),
            part_number: part_number.into(),
            description: description.into(),
            page,
        }
    }

    /// Reference in the case-folded form used for every comparison.
    pub fn reference_key(&self) -> String {
        self.reference.to_uppercase()
    }
}
