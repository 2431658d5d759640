//! OCR word boxes as delivered by the OCR collaborator.

use serde::{Deserialize, Serialize};

/// One detected token on a rasterized page. Coordinates are the center of the
/// bounding box in page pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub w: f64,
    #[serde(default)]
    pub h: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// Build a word from the min/max extents of its bounding polygon.
    pub fn from_extents(text: impl Into<String>, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            text: text.into(),
            x: (x_min + x_max) / 2.0,
            y: (y_min + y_max) / 2.0,
            w: x_max - x_min,
            h: y_max - y_min,
        }
    }
}

/// Full OCR output for a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageText {
    pub full_text: String,
    pub words: Vec<Word>,
}

impl PageText {
    pub const NO_TEXT: &'static str = "NO TEXT FOUND";

    pub fn empty() -> Self {
        Self {
            full_text: Self::NO_TEXT.to_string(),
            words: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_from_extents() {
        let word = Word::from_extents("12", 10.0, 20.0, 30.0, 60.0);
        assert_eq!(word.x, 20.0);
        assert_eq!(word.y, 40.0);
        assert_eq!(word.w, 20.0);
        assert_eq!(word.h, 40.0);
    }

    #[test]
    fn test_word_size_defaults_when_missing() {
        let word: Word = serde_json::from_str(r#"{"text":"A1","x":1.5,"y":2.0}"#).unwrap();
        assert_eq!(word.w, 0.0);
        assert_eq!(word.h, 0.0);
    }
}
