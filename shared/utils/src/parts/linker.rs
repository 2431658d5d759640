//! Linker
//!
//! Joins each page's candidate boxes with the BOM rows they reference.

use std::collections::BTreeMap;

use exview_models::{CandidateBox, LinkedRow, PageNumber};

use super::index::BomIndex;

pub struct PartLinker<'a> {
    index: &'a BomIndex,
}

impl<'a> PartLinker<'a> {
    pub fn new(index: &'a BomIndex) -> Self {
        Self { index }
    }

    /// Linked rows for one page, in box order. Boxes without a BOM row are dropped.
    pub fn link_page(&self, boxes: &[CandidateBox]) -> Vec<LinkedRow> {
        boxes
            .iter()
            .filter_map(|candidate| {
                self.index
                    .lookup(&candidate.token)
                    .map(|row| LinkedRow::join(row, candidate))
            })
            .collect()
    }

    pub fn link_by_page(
        &self,
        boxes_by_page: &BTreeMap<PageNumber, Vec<CandidateBox>>,
    ) -> BTreeMap<PageNumber, Vec<LinkedRow>> {
        boxes_by_page
            .iter()
            .map(|(&page, boxes)| (page, self.link_page(boxes)))
            .collect()
    }
}
