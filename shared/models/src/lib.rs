//! # Exview Core Domain Models
//!
//! Plain records exchanged between the OCR and table-extraction collaborators,
//! the part-linking pipeline and the presentation layer.
//!
//! ## Key Models
//!
//! - **BomRow**: one row of an extracted bill of materials
//! - **Word**: one OCR token with its bounding box
//! - **CandidateBox**: a normalized part reference positioned on a diagram page
//! - **LinkedRow**: a candidate box joined with its BOM row
//! - **AnomalyRow**: a reference present on only one side of the BOM/diagram pair
//!
//! All models serialize with serde using the column names of the review tables.

pub mod bom;
pub mod ocr;
pub mod detection;

#[cfg(test)]
pub mod property_tests;

pub use bom::*;
pub use ocr::*;
pub use detection::*;
