//! Anomaly Detector
//!
//! Set differences between the references found on the diagrams and the
//! references listed in the BOM.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use exview_models::{AnomalyRow, CandidateBox, PageNumber};

use super::index::BomIndex;

/// Distinct tokens per page, as used for anomaly detection.
pub fn detected_tokens_by_page(
    boxes_by_page: &BTreeMap<PageNumber, Vec<CandidateBox>>,
) -> BTreeMap<PageNumber, BTreeSet<String>> {
    boxes_by_page
        .iter()
        .map(|(&page, boxes)| (page, boxes.iter().map(|b| b.token.clone()).collect()))
        .collect()
}

pub struct AnomalyDetector<'a> {
    index: &'a BomIndex,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(index: &'a BomIndex) -> Self {
        Self { index }
    }

    /// "Not in Diagram" rows in BOM order, then "Not in BOM" rows in lexical order.
    ///
    /// The row set depends only on the two set differences.
    pub fn detect(&self, detected_by_page: &BTreeMap<PageNumber, BTreeSet<String>>) -> Vec<AnomalyRow> {
        let detected: BTreeSet<String> = detected_by_page
            .values()
            .flatten()
            .map(|token| token.to_uppercase())
            .collect();

        let mut anomalies = Vec::new();
        let mut reported: HashSet<String> = HashSet::new();

        for row in self.index.rows() {
            let key = row.reference_key();
            if detected.contains(&key) || !reported.insert(key.clone()) {
                continue;
            }
            if let Some(first) = self.index.lookup(&key) {
                anomalies.push(AnomalyRow::not_in_diagram(first));
            }
        }

        anomalies.extend(
            detected
                .iter()
                .filter(|token| !self.index.references().contains(*token))
                .map(AnomalyRow::not_in_bom),
        );

        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exview_models::{AnomalyType, BomRow};

    fn tokens(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_differences() {
        let index = BomIndex::new(vec![
            BomRow::new("12", "PN-12", "Shelf", 1),
            BomRow::new("34", "PN-34", "Gasket", 1),
        ]);
        let mut detected = BTreeMap::new();
        detected.insert(1, tokens(&["12", "99"]));

        let anomalies = AnomalyDetector::new(&index).detect(&detected);

        assert_eq!(
            anomalies,
            vec![
                AnomalyRow {
                    kind: AnomalyType::NotInDiagram,
                    reference: "34".to_string(),
                    part_number: "PN-34".to_string(),
                    description: "Gasket".to_string(),
                },
                AnomalyRow::not_in_bom("99"),
            ]
        );
    }

    #[test]
    fn test_duplicate_bom_rows_reported_once() {
        let index = BomIndex::new(vec![
            BomRow::new("34", "X", "", 1),
            BomRow::new("34", "Y", "", 2),
        ]);

        let anomalies = AnomalyDetector::new(&index).detect(&BTreeMap::new());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].part_number, "X");
    }

    #[test]
    fn test_union_across_pages_and_case() {
        let index = BomIndex::new(vec![BomRow::new("ab1", "PN", "", 1), BomRow::new("7", "PN", "", 1)]);
        let mut detected = BTreeMap::new();
        detected.insert(1, tokens(&["AB1"]));
        detected.insert(2, tokens(&["7", "x9"]));

        let anomalies = AnomalyDetector::new(&index).detect(&detected);

        assert_eq!(anomalies, vec![AnomalyRow::not_in_bom("X9")]);
    }

    #[test]
    fn test_empty_inputs() {
        let index = BomIndex::default();
        assert!(AnomalyDetector::new(&index).detect(&BTreeMap::new()).is_empty());
    }
}
