//! BOM (Bill of Materials) Module
//!
//! Manufacturer column profiles, parsing of extracted tables into BOM rows,
//! and validation of the resulting table.

pub mod profile;
pub mod table;
pub mod validator;

pub use profile::{ManufacturerProfile, ProfileRegistry};
pub use table::{ExtractedTable, ParsedBom, TableParser};
pub use validator::{BomValidator, ValidationIssue, ValidationResult, ValidationSeverity};
