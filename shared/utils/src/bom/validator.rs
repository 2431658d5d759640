//! BOM Validator
//!
//! Reports issues in an extracted BOM before it is used for linking.

use serde::Serialize;
use std::collections::HashMap;
use validator::Validate;

use exview_models::BomRow;

use crate::validation::format_validation_errors;

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// Single validation issue
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// 1-based position in the BOM table.
    pub row: Option<usize>,
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub total_rows: usize,
    pub distinct_references: usize,
    pub duplicate_references: usize,
    pub missing_descriptions: usize,
}

pub struct BomValidator {
    flag_missing_descriptions: bool,
}

impl Default for BomValidator {
    fn default() -> Self {
        Self {
            flag_missing_descriptions: true,
        }
    }
}

impl BomValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_descriptions(mut self, flag: bool) -> Self {
        self.flag_missing_descriptions = flag;
        self
    }

    pub fn validate(&self, rows: &[BomRow]) -> ValidationResult {
        let mut issues = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut duplicate_references = 0;
        let mut missing_descriptions = 0;

        for (idx, row) in rows.iter().enumerate() {
            let position = idx + 1;

            if let Err(errors) = row.validate() {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Error,
                    row: Some(position),
                    field: None,
                    message: format_validation_errors(&errors),
                });
            }

            // Lookups take the first row; later duplicates are shadowed.
            match first_seen.get(&row.reference_key()) {
                Some(&first) => {
                    duplicate_references += 1;
                    issues.push(ValidationIssue {
                        severity: ValidationSeverity::Warning,
                        row: Some(position),
                        field: Some("REF".to_string()),
                        message: format!(
                            "Duplicate REF '{}' is shadowed by row {}",
                            row.reference, first
                        ),
                    });
                }
                None => {
                    first_seen.insert(row.reference_key(), position);
                }
            }

            if self.flag_missing_descriptions && row.description.trim().is_empty() {
                missing_descriptions += 1;
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Info,
                    row: Some(position),
                    field: Some("DESCRIPTION".to_string()),
                    message: "Missing description".to_string(),
                });
            }
        }

        let error_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Error).count();
        let warning_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Warning).count();

        ValidationResult {
            is_valid: error_count == 0,
            error_count,
            warning_count,
            issues,
            summary: ValidationSummary {
                total_rows: rows.len(),
                distinct_references: first_seen.len(),
                duplicate_references,
                missing_descriptions,
            },
        }
    }
}
