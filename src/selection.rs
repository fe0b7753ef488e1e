use alloc::vec::Vec;
use core::cmp;

use crate::ItemRange;

/// Why a [`SelectionChange`] happened. Decides how live items are refreshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionChangeReason {
    /// `range` became selected; nothing else changed.
    AddSelection,
    /// `range` became unselected; nothing else changed.
    RemoveSelection,
    /// Exactly `range` is selected now.
    ReplaceSelection,
    /// The selection changed in a way that is not expressed by `range` alone (for example
    /// selected items were removed from the data source).
    Refresh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionChange {
    pub reason: SelectionChangeReason,
    pub range: ItemRange,
}

impl SelectionChange {
    pub fn new(reason: SelectionChangeReason, range: ItemRange) -> Self {
        Self { reason, range }
    }
}

/// The set of selected indexes, kept as sorted, non-overlapping, non-adjacent ranges.
///
/// The store knows nothing about which items are live; it only follows insertions and removals
/// in the collection so that a selected item stays selected while its index moves. No operation
/// panics: empty ranges are no-ops and `index + count` saturates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "SerializedSelection"))]
pub struct SelectionStore {
    ranges: Vec<ItemRange>,
}

/// Wire form of [`SelectionStore`]. Its ranges are untrusted and re-added one by one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SerializedSelection {
    ranges: Vec<ItemRange>,
}

#[cfg(feature = "serde")]
impl From<SerializedSelection> for SelectionStore {
    fn from(raw: SerializedSelection) -> Self {
        Self::from_ranges(raw.ranges)
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from arbitrary ranges: unsorted, overlapping, adjacent or empty input is
    /// normalized.
    pub fn from_ranges(ranges: impl IntoIterator<Item = ItemRange>) -> Self {
        let mut store = Self::new();
        for r in ranges {
            store.add_selection(r.index, r.count);
        }
        store
    }

    pub fn ranges(&self) -> &[ItemRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.ranges.is_empty();
        self.ranges.clear();
        changed
    }

    /// Selects exactly `index..index + count`. `count == 0` selects nothing.
    ///
    /// Returns whether the selection changed.
    pub fn replace_selection(&mut self, index: usize, count: usize) -> bool {
        let range = ItemRange::from(index..index.saturating_add(count));
        if range.is_empty() {
            return self.clear();
        }
        if self.ranges.len() == 1 && self.ranges[0] == range {
            return false;
        }
        self.ranges.clear();
        self.ranges.push(range);
        true
    }

    /// Returns whether any index became selected.
    pub fn add_selection(&mut self, index: usize, count: usize) -> bool {
        let added = ItemRange::from(index..index.saturating_add(count));
        if added.is_empty() {
            return false;
        }
        if self
            .ranges
            .iter()
            .any(|r| r.index <= added.index && r.end() >= added.end())
        {
            return false;
        }

        // Every range overlapping or touching `added` collapses into one.
        let first = self.ranges.partition_point(|r| r.end() < added.index);
        let last = self.ranges.partition_point(|r| r.index <= added.end());
        let mut start = added.index;
        let mut end = added.end();
        if first < last {
            start = cmp::min(start, self.ranges[first].index);
            end = cmp::max(end, self.ranges[last - 1].end());
        }
        self.ranges
            .splice(first..last, core::iter::once(ItemRange::from(start..end)));
        true
    }

    /// Returns whether any index became unselected.
    pub fn remove_selection(&mut self, index: usize, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        let removed = ItemRange::new(index, count);
        let first = self.ranges.partition_point(|r| r.end() <= removed.index);
        let last = self.ranges.partition_point(|r| r.index < removed.end());
        if first >= last {
            return false;
        }

        let head = self.ranges[first];
        let tail = self.ranges[last - 1];
        let mut kept = Vec::with_capacity(2);
        if head.index < removed.index {
            kept.push(ItemRange::from(head.index..removed.index));
        }
        if tail.end() > removed.end() {
            kept.push(ItemRange::from(removed.end()..tail.end()));
        }
        self.ranges.splice(first..last, kept);
        true
    }

    /// Toggles `index` and returns its new state.
    pub fn revert_selection(&mut self, index: usize) -> bool {
        if self.is_index_selected(index) {
            self.remove_selection(index, 1);
            false
        } else {
            self.add_selection(index, 1);
            true
        }
    }

    pub fn is_index_selected(&self, index: usize) -> bool {
        let i = self.ranges.partition_point(|r| r.end() <= index);
        self.ranges.get(i).is_some_and(|r| r.contains(index))
    }

    pub fn first_selected_index(&self) -> Option<usize> {
        self.ranges.first().map(|r| r.index)
    }

    pub fn all_selected_indexes(&self) -> Vec<usize> {
        self.ranges.iter().flat_map(|r| r.indexes()).collect()
    }

    pub fn all_selected_count(&self) -> usize {
        self.ranges.iter().map(|r| r.count).sum()
    }

    /// Renumbers the selection after `count` items were inserted at `index`.
    ///
    /// Inserted items are not selected; a selected range spanning `index` is split around them.
    /// Returns whether any stored index moved.
    pub fn adjust_selection_by_adding_indexes(&mut self, index: usize, count: usize) -> bool {
        if count == 0 || self.ranges.is_empty() {
            return false;
        }

        let mut changed = false;
        let mut adjusted = Vec::with_capacity(self.ranges.len() + 1);
        let shifted = |start: usize, len: usize| {
            let start = start.saturating_add(count);
            ItemRange::from(start..start.saturating_add(len))
        };
        for r in self.ranges.drain(..) {
            if r.index >= index {
                adjusted.push(shifted(r.index, r.count));
                changed = true;
            } else if r.end() > index {
                adjusted.push(ItemRange::from(r.index..index));
                adjusted.push(shifted(index, r.end() - index));
                changed = true;
            } else {
                adjusted.push(r);
            }
        }
        // Ranges pushed past `usize::MAX` collapse to empty ones at the end of the index space.
        adjusted.retain(|r| !r.is_empty());
        self.ranges = adjusted;
        changed
    }

    /// Renumbers the selection after `count` items were removed at `index`, dropping selected
    /// indexes inside the removed range.
    ///
    /// Returns whether any selected index was dropped.
    pub fn adjust_selection_by_removing_indexes(&mut self, index: usize, count: usize) -> bool {
        if count == 0 || self.ranges.is_empty() {
            return false;
        }

        let dropped = self.remove_selection(index, count);
        let end = index.saturating_add(count);
        let shift = end - index;

        let mut merged: Vec<ItemRange> = Vec::with_capacity(self.ranges.len());
        for mut r in self.ranges.drain(..) {
            if r.index >= end {
                r.index -= shift;
            }
            match merged.last_mut() {
                Some(prev) if prev.end() == r.index => prev.count += r.count,
                _ => merged.push(r),
            }
        }
        self.ranges = merged;
        dropped
    }
}
