//! Candidate part-reference boxes and the review tables built from them.

use serde::{Deserialize, Serialize};

use crate::bom::BomRow;
use crate::ocr::Word;

/// Overlay color of a candidate box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    /// Token matches a BOM reference.
    Green,
    /// Token has no BOM counterpart.
    Red,
}

impl BoxColor {
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::Green
        } else {
            Self::Red
        }
    }
}

/// A detected part reference positioned on a diagram page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateBox {
    /// Normalized, upper-case token.
    pub token: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub color: BoxColor,
}

impl CandidateBox {
    pub fn from_word(word: &Word, token: String, color: BoxColor) -> Self {
        Self {
            token,
            x: word.x,
            y: word.y,
            w: word.w,
            h: word.h,
            color,
        }
    }

    /// Rectangle corners `(x0, y0, x1, y1)` for drawing the overlay.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let (half_w, half_h) = (self.w / 2.0, self.h / 2.0);
        (self.x - half_w, self.y - half_h, self.x + half_w, self.y + half_h)
    }
}

/// A candidate box joined with its BOM row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedRow {
    #[serde(rename = "REF")]
    pub reference: String,
    #[serde(rename = "PART_NUMBER")]
    pub part_number: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "W")]
    pub w: f64,
    #[serde(rename = "H")]
    pub h: f64,
    #[serde(rename = "Color")]
    pub color: BoxColor,
}

impl LinkedRow {
    pub fn join(row: &BomRow, candidate: &CandidateBox) -> Self {
        Self {
            reference: row.reference.clone(),
            part_number: row.part_number.clone(),
            description: row.description.clone(),
            x: candidate.x,
            y: candidate.y,
            w: candidate.w,
            h: candidate.h,
            color: candidate.color,
        }
    }
}

/// Category of a BOM/diagram mismatch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnomalyType {
    #[serde(rename = "Not in Diagram")]
    NotInDiagram,
    #[serde(rename = "Not in BOM")]
    NotInBom,
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInDiagram => write!(f, "Not in Diagram"),
            Self::NotInBom => write!(f, "Not in BOM"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AnomalyRow {
    #[serde(rename = "Type")]
    pub kind: AnomalyType,
    #[serde(rename = "REF")]
    pub reference: String,
    #[serde(rename = "PART_NUMBER")]
    pub part_number: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
}

impl AnomalyRow {
    pub fn not_in_diagram(row: &BomRow) -> Self {
        Self {
            kind: AnomalyType::NotInDiagram,
            reference: row.reference.clone(),
            part_number: row.part_number.clone(),
            description: row.description.clone(),
        }
    }

    pub fn not_in_bom(token: impl Into<String>) -> Self {
        Self {
            kind: AnomalyType::NotInBom,
            reference: token.into(),
            part_number: String::new(),
            description: String::new(),
        }
    }
}
