//! Case-folded view of a BOM table.
//!
//! One index feeds box coloring, linking and anomaly detection so all three
//! see the same reference set.

use std::collections::{HashMap, HashSet};

use exview_models::BomRow;

#[derive(Debug, Clone, Default)]
pub struct BomIndex {
    rows: Vec<BomRow>,
    references: HashSet<String>,
    first_row: HashMap<String, usize>,
}

impl BomIndex {
    pub fn new(rows: Vec<BomRow>) -> Self {
        let mut references = HashSet::with_capacity(rows.len());
        let mut first_row = HashMap::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let key = row.reference_key();
            references.insert(key.clone());
            // Table order decides: the first row for a REF wins.
            first_row.entry(key).or_insert(idx);
        }

        Self {
            rows,
            references,
            first_row,
        }
    }

    pub fn from_rows(rows: &[BomRow]) -> Self {
        Self::new(rows.to_vec())
    }

    /// Upper-cased references.
    pub fn references(&self) -> &HashSet<String> {
        &self.references
    }

    /// First BOM row whose REF equals `token`, ignoring case.
    pub fn lookup(&self, token: &str) -> Option<&BomRow> {
        self.first_row
            .get(&token.to_uppercase())
            .map(|&idx| &self.rows[idx])
    }

    pub fn rows(&self) -> &[BomRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
