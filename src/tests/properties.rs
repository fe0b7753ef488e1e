use crate::tests::support::{TestDelegate, TestSource};
use crate::*;

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use proptest::prelude::*;

fn variable(heights: &[f32], spacing: f32) -> (ItemHeightManager, TestSource, TestDelegate) {
    let source = TestSource::with_heights(heights);
    let delegate = TestDelegate::new(true, spacing);
    let mut m = ItemHeightManager::new();
    m.reload(Some(Binding::new(&source, &delegate)));
    (m, source, delegate)
}

fn heights_strategy(min: u8) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec((min..40u8).prop_map(f32::from), 0..60)
}

fn assert_canonical(store: &SelectionStore) {
    for range in store.ranges() {
        assert!(range.count > 0, "empty range in {store:?}");
    }
    for pair in store.ranges().windows(2) {
        assert!(pair[0].end() < pair[1].index, "unsorted or adjacent ranges in {store:?}");
    }
}

proptest! {
    #[test]
    fn positions_accumulate_heights_and_spacing(
        heights in heights_strategy(0),
        spacing in 0u8..6,
    ) {
        let spacing = f32::from(spacing);
        let (m, _, _) = variable(&heights, spacing);
        prop_assert_eq!(m.item_count(), heights.len());

        let mut expected = 0.0f32;
        for (i, &h) in heights.iter().enumerate() {
            prop_assert_eq!(m.item_geometry(i), ItemGeometry::from((expected, h)));
            expected += h + spacing;
        }
        let total = if heights.is_empty() { 0.0 } else { expected - spacing };
        prop_assert_eq!(m.total_height(), total);
    }

    #[test]
    fn insert_then_remove_restores_the_table(
        heights in heights_strategy(0),
        extra in heights_strategy(0),
        at in any::<prop::sample::Index>(),
        spacing in 0u8..6,
    ) {
        let (mut m, mut source, delegate) = variable(&heights, f32::from(spacing));
        let original = m.clone();
        let index = at.index(heights.len() + 1);

        let rows = source.make_rows(&extra);
        source.rows.splice(index..index, rows);
        let moved = m.on_data_added(index, extra.len(), Some(Binding::new(&source, &delegate)));
        prop_assert_eq!(m.item_count(), heights.len() + extra.len());
        prop_assert!(moved >= 0.0);

        source.rows.drain(index..index + extra.len());
        let back = m.on_data_removed(index, extra.len());
        prop_assert_eq!(back, -moved);
        prop_assert_eq!(m, original);
    }

    #[test]
    fn range_query_matches_a_linear_scan(
        heights in heights_strategy(1),
        spacing in 0u8..6,
        begin in 0u32..1500,
        len in 1u32..400,
    ) {
        let (m, _, _) = variable(&heights, f32::from(spacing));
        let (begin, end) = (begin as f32, (begin + len) as f32);
        let range = m.item_range(begin, end);

        let first = (0..heights.len()).find(|&i| m.item_geometry(i).end() > begin);
        let stop = (0..heights.len())
            .filter(|&i| m.item_geometry(i).position < end)
            .count();
        match first {
            Some(first) if first < stop => {
                prop_assert_eq!(range, ItemRange::from(first..stop));
            }
            _ => prop_assert!(range.is_empty()),
        }
        for i in range.indexes() {
            let g = m.item_geometry(i);
            prop_assert!(g.position < end && g.end() > begin);
        }
    }

    #[test]
    fn selection_matches_a_set_model(
        ops in proptest::collection::vec((0u8..5, 0usize..60, 1usize..8), 0..40),
    ) {
        let mut store = SelectionStore::new();
        let mut model = BTreeSet::new();

        for (kind, index, count) in ops {
            match kind {
                0 => {
                    store.add_selection(index, count);
                    model.extend(index..index + count);
                }
                1 => {
                    store.remove_selection(index, count);
                    for i in index..index + count {
                        model.remove(&i);
                    }
                }
                2 => {
                    store.adjust_selection_by_adding_indexes(index, count);
                    model = model
                        .into_iter()
                        .map(|i| if i >= index { i + count } else { i })
                        .collect();
                }
                3 => {
                    store.adjust_selection_by_removing_indexes(index, count);
                    model = model
                        .into_iter()
                        .filter(|&i| i < index || i >= index + count)
                        .map(|i| if i >= index + count { i - count } else { i })
                        .collect();
                }
                _ => {
                    let now = store.revert_selection(index);
                    if !model.remove(&index) {
                        model.insert(index);
                    }
                    prop_assert_eq!(now, model.contains(&index));
                }
            }

            assert_canonical(&store);
            let expected: Vec<usize> = model.iter().copied().collect();
            prop_assert_eq!(store.all_selected_indexes(), expected);
            prop_assert_eq!(store.all_selected_count(), model.len());
            prop_assert_eq!(store.first_selected_index(), model.first().copied());
        }
    }
}
