use core::cmp;

/// A half-open run of item indexes: `index..index + count`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRange {
    pub index: usize,
    pub count: usize,
}

impl ItemRange {
    pub const fn new(index: usize, count: usize) -> Self {
        Self { index, count }
    }

    pub fn end(&self) -> usize {
        self.index.saturating_add(self.count)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.index && index < self.end()
    }

    /// Returns the overlap of two ranges, or `None` when they are disjoint or either is empty.
    pub fn intersection(&self, other: &ItemRange) -> Option<ItemRange> {
        let start = cmp::max(self.index, other.index);
        let end = cmp::min(self.end(), other.end());
        (start < end).then(|| ItemRange::new(start, end - start))
    }

    pub fn indexes(&self) -> core::ops::Range<usize> {
        self.index..self.end()
    }

    /// Clamps the range to `0..len`.
    pub fn clamp_to(&self, len: usize) -> ItemRange {
        let start = cmp::min(self.index, len);
        let end = cmp::min(self.end(), len);
        ItemRange::new(start, end - start)
    }
}

impl From<core::ops::Range<usize>> for ItemRange {
    fn from(r: core::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end.saturating_sub(r.start))
    }
}

/// The edits needed to turn an existing window of live items into a new one.
///
/// Removals are applied first (`remove_head` items from the front, `remove_tail` from the
/// back), then `add_head` is prepended and `add_tail` appended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeDifference {
    pub remove_head: usize,
    pub remove_tail: usize,
    pub add_head: ItemRange,
    pub add_tail: ItemRange,
}

impl RangeDifference {
    pub fn is_empty(&self) -> bool {
        self.remove_head == 0
            && self.remove_tail == 0
            && self.add_head.is_empty()
            && self.add_tail.is_empty()
    }
}

/// Computes the minimal head/tail edits that turn the `old` window into the `new` one.
///
/// When the ranges are disjoint every old item is dropped and every new item is created.
/// Otherwise only the non-overlapping ends are touched, so the work is proportional to the
/// scroll or mutation delta.
pub fn calculate_range_difference(new: ItemRange, old: ItemRange) -> RangeDifference {
    if new.intersection(&old).is_none() {
        return RangeDifference {
            remove_head: old.count,
            remove_tail: 0,
            add_head: ItemRange::new(new.index, 0),
            add_tail: new,
        };
    }

    let remove_head = new.index.saturating_sub(old.index);
    let remove_tail = old.end().saturating_sub(new.end());
    let add_head = if new.index < old.index {
        ItemRange::new(new.index, old.index - new.index)
    } else {
        ItemRange::new(new.index, 0)
    };
    let add_tail = if new.end() > old.end() {
        ItemRange::new(old.end(), new.end() - old.end())
    } else {
        ItemRange::new(new.end(), 0)
    };

    RangeDifference {
        remove_head,
        remove_tail,
        add_head,
        add_tail,
    }
}
