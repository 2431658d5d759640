//! Property-based tests for the Exview domain models.

use proptest::prelude::*;

use crate::{BomRow, BoxColor, CandidateBox, LinkedRow, Word};

prop_compose! {
    fn arb_word()(
        text in "[A-Z0-9]{1,8}",
        x in 0.0..5000.0f64,
        y in 0.0..5000.0f64,
        w in 0.0..400.0f64,
        h in 0.0..400.0f64
    ) -> Word {
        Word::new(text, x, y, w, h)
    }
}

fn arb_color() -> impl Strategy<Value = BoxColor> {
    prop_oneof![Just(BoxColor::Green), Just(BoxColor::Red)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Overlay rectangles are centered on the source word and span its size.
    #[test]
    fn prop_corners_are_centered(word in arb_word(), color in arb_color()) {
        let candidate = CandidateBox::from_word(&word, word.text.clone(), color);
        let (x0, y0, x1, y1) = candidate.corners();

        prop_assert!(((x0 + x1) / 2.0 - word.x).abs() < 1e-6);
        prop_assert!(((y0 + y1) / 2.0 - word.y).abs() < 1e-6);
        prop_assert!(((x1 - x0) - word.w).abs() < 1e-6);
        prop_assert!(((y1 - y0) - word.h).abs() < 1e-6);
    }

    /// A linked row keeps the BOM fields and the box position untouched.
    #[test]
    fn prop_linked_row_preserves_both_sides(
        word in arb_word(),
        color in arb_color(),
        part_number in "[A-Z0-9-]{1,12}",
        description in "[A-Za-z ]{0,30}"
    ) {
        let bom = BomRow::new(word.text.clone(), part_number.clone(), description.clone(), 1);
        let candidate = CandidateBox::from_word(&word, word.text.clone(), color);
        let linked = LinkedRow::join(&bom, &candidate);

        prop_assert_eq!(linked.part_number, part_number);
        prop_assert_eq!(linked.description, description);
        prop_assert_eq!(linked.color, color);
        prop_assert_eq!(linked.x, word.x);
        prop_assert_eq!(linked.y, word.y);
    }
}
