use alloc::vec::Vec;
use core::cmp;

use crate::error::{Error, Result};
use crate::host::{Binding, DataSource, ItemDelegate};
use crate::{ItemGeometry, ItemRange};

#[derive(Clone, Debug, PartialEq)]
enum HeightStrategy {
    Fixed {
        /// `None` until an item has been seen to estimate from.
        item_height: Option<f32>,
        spacing: f32,
        item_count: usize,
    },
    Variable {
        spacing: f32,
        /// `item_positions[i]` is the start of item `i`; the last entry is the total extent plus
        /// one trailing spacing unit. Always `item_count + 1` entries, starting at `0.0`.
        item_positions: Vec<f32>,
    },
}

/// Where a position falls relative to the item layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Location {
    Item(usize),
    /// Inside the spacing right before item `next`.
    Spacing { next: usize },
}

/// Index → (position, height) for the whole collection, under a fixed or variable strategy.
///
/// The strategy is picked on [`reload`](Self::reload) from
/// [`ItemDelegate::has_variable_item_height`]. Fixed heights answer every query in `O(1)`;
/// variable heights keep a table of cumulative start positions, answer geometry in `O(1)`, point
/// and range queries in `O(log n)`, and patch the table in place on mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemHeightManager {
    strategy: HeightStrategy,
}

impl Default for ItemHeightManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemHeightManager {
    /// Creates an empty manager. Call [`reload`](Self::reload) once a binding is available.
    pub fn new() -> Self {
        Self {
            strategy: HeightStrategy::Fixed {
                item_height: None,
                spacing: 0.0,
                item_count: 0,
            },
        }
    }

    /// Rebuilds all geometry from scratch.
    ///
    /// Without a binding the manager falls back to the empty state.
    pub fn reload<S, D>(&mut self, binding: Option<Binding<'_, S, D>>)
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data> + ?Sized,
    {
        let Some(binding) = binding else {
            vdebug!("ItemHeightManager::reload without binding");
            *self = Self::new();
            return;
        };

        let count = binding.data_source.data_count();
        let spacing = sanitize(binding.delegate.item_spacing());

        if binding.delegate.has_variable_item_height() {
            let mut item_positions = Vec::with_capacity(count + 1);
            let mut position = 0.0f32;
            item_positions.push(position);
            for i in 0..count {
                position += estimate_height(binding, i) + spacing;
                item_positions.push(position);
            }
            self.strategy = HeightStrategy::Variable {
                spacing,
                item_positions,
            };
        } else {
            let item_height = (count > 0).then(|| estimate_height(binding, 0));
            self.strategy = HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count: count,
            };
        }

        vdebug!(
            count,
            spacing,
            variable = self.has_variable_height(),
            "ItemHeightManager::reload"
        );
    }

    pub fn has_variable_height(&self) -> bool {
        matches!(self.strategy, HeightStrategy::Variable { .. })
    }

    pub fn spacing(&self) -> f32 {
        match &self.strategy {
            HeightStrategy::Fixed { spacing, .. } | HeightStrategy::Variable { spacing, .. } => {
                *spacing
            }
        }
    }

    pub fn item_count(&self) -> usize {
        match &self.strategy {
            HeightStrategy::Fixed { item_count, .. } => *item_count,
            HeightStrategy::Variable { item_positions, .. } => item_positions.len() - 1,
        }
    }

    /// Returns `(0, 0)` for an out-of-range index.
    pub fn item_geometry(&self, index: usize) -> ItemGeometry {
        match &self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                if index >= *item_count {
                    return ItemGeometry::default();
                }
                let height = item_height.unwrap_or(0.0);
                ItemGeometry {
                    position: index as f32 * (height + spacing),
                    height,
                }
            }
            HeightStrategy::Variable {
                spacing,
                item_positions,
            } => {
                if index + 1 >= item_positions.len() {
                    return ItemGeometry::default();
                }
                let position = item_positions[index];
                let height = (item_positions[index + 1] - position - spacing).max(0.0);
                ItemGeometry { position, height }
            }
        }
    }

    /// Returns the item covering `position`, or `None` when the position falls into the spacing
    /// between two items or outside every item.
    ///
    /// An item covers `[position, position + height)`; the spacing after it covers
    /// `[position + height, next_position)`.
    pub fn item_index(&self, position: f32) -> Option<usize> {
        match self.locate(position)? {
            Location::Item(index) => Some(index),
            Location::Spacing { .. } => None,
        }
    }

    /// Returns the first item intersecting `[begin_position, end_position)` and the number of
    /// consecutive items that do.
    ///
    /// A begin position inside a spacing gap resolves to the next item. Items partially
    /// overlapping either boundary are included. `begin_position < end_position` is a caller
    /// contract; release builds answer an empty range when it is violated.
    pub fn item_range(&self, begin_position: f32, end_position: f32) -> ItemRange {
        debug_assert!(
            begin_position < end_position,
            "item_range requires begin < end (begin={begin_position}, end={end_position})"
        );
        if !(begin_position < end_position) {
            return ItemRange::new(0, 0);
        }

        let count = self.item_count();
        let Some(begin_index) = self.first_index_at_or_after(begin_position) else {
            return ItemRange::new(count, 0);
        };
        let end_index = self.count_items_starting_before(end_position);
        ItemRange::new(begin_index, end_index.saturating_sub(begin_index))
    }

    /// Checked variant of [`item_range`](Self::item_range).
    pub fn try_item_range(&self, begin_position: f32, end_position: f32) -> Result<ItemRange> {
        if !(begin_position < end_position) {
            return Err(Error::InvalidRange {
                begin: begin_position,
                end: end_position,
            });
        }
        Ok(self.item_range(begin_position, end_position))
    }

    pub fn total_height(&self) -> f32 {
        match &self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                if *item_count == 0 {
                    return 0.0;
                }
                let height = item_height.unwrap_or(0.0);
                (*item_count as f32 * (height + spacing) - spacing).max(0.0)
            }
            HeightStrategy::Variable {
                spacing,
                item_positions,
            } => {
                if item_positions.len() <= 1 {
                    return 0.0;
                }
                let last = item_positions[item_positions.len() - 1];
                (last - spacing).max(0.0)
            }
        }
    }

    /// Accounts for `count` items inserted at `index`.
    ///
    /// Returns how far the items after the insertion moved.
    pub fn on_data_added<S, D>(
        &mut self,
        index: usize,
        count: usize,
        binding: Option<Binding<'_, S, D>>,
    ) -> f32
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data> + ?Sized,
    {
        if count == 0 {
            return 0.0;
        }
        let index = cmp::min(index, self.item_count());
        vtrace!(index, count, "ItemHeightManager::on_data_added");

        match &mut self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                *item_count += count;
                if item_height.is_none() {
                    *item_height = Some(binding.map_or(0.0, |b| estimate_height(b, 0)));
                }
                count as f32 * (item_height.unwrap_or(0.0) + *spacing)
            }
            HeightStrategy::Variable {
                spacing,
                item_positions,
            } => {
                let start = item_positions[index];
                let mut added = 0.0f32;
                let mut inserted = Vec::with_capacity(count);
                for i in index..index + count {
                    inserted.push(start + added);
                    let height = binding.map_or(0.0, |b| estimate_height(b, i));
                    added += height + *spacing;
                }
                item_positions.splice(index..index, inserted);
                for position in &mut item_positions[index + count..] {
                    *position += added;
                }
                added
            }
        }
    }

    /// Accounts for `count` items removed at `index`.
    ///
    /// Returns how far the items after the removal moved (zero or negative).
    pub fn on_data_removed(&mut self, index: usize, count: usize) -> f32 {
        let range = ItemRange::new(index, count).clamp_to(self.item_count());
        if range.is_empty() {
            return 0.0;
        }
        vtrace!(index, count, "ItemHeightManager::on_data_removed");

        match &mut self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                *item_count -= range.count;
                -(range.count as f32 * (item_height.unwrap_or(0.0) + *spacing))
            }
            HeightStrategy::Variable { item_positions, .. } => {
                let removed = item_positions[range.end()] - item_positions[range.index];
                item_positions.drain(range.indexes());
                for position in &mut item_positions[range.index..] {
                    *position -= removed;
                }
                -removed
            }
        }
    }

    /// Re-estimates the heights of `count` items at `index`.
    ///
    /// Returns how far the items after the range moved.
    pub fn on_data_updated<S, D>(
        &mut self,
        index: usize,
        count: usize,
        binding: Option<Binding<'_, S, D>>,
    ) -> f32
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data> + ?Sized,
    {
        let range = ItemRange::new(index, count).clamp_to(self.item_count());
        if range.is_empty() {
            return 0.0;
        }
        vtrace!(index, count, "ItemHeightManager::on_data_updated");

        let HeightStrategy::Variable {
            spacing,
            item_positions,
        } = &mut self.strategy
        else {
            return 0.0;
        };

        let old_end = item_positions[range.end()];
        let mut position = item_positions[range.index];
        for i in range.indexes() {
            let height = binding.map_or(0.0, |b| estimate_height(b, i));
            position += height + *spacing;
            item_positions[i + 1] = position;
        }

        let difference = position - old_end;
        if difference != 0.0 {
            for p in &mut item_positions[range.end() + 1..] {
                *p += difference;
            }
        }
        difference
    }

    /// Accounts for one item moving from `previous_index` to `new_index` by re-estimating every
    /// item in between.
    pub fn on_data_moved<S, D>(
        &mut self,
        previous_index: usize,
        new_index: usize,
        binding: Option<Binding<'_, S, D>>,
    ) -> f32
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data> + ?Sized,
    {
        let begin = cmp::min(previous_index, new_index);
        let end = cmp::max(previous_index, new_index).saturating_add(1);
        self.on_data_updated(begin, end - begin, binding)
    }

    fn locate(&self, position: f32) -> Option<Location> {
        if !(position >= 0.0) {
            return None;
        }

        let location = match &self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                let height = item_height.unwrap_or(0.0);
                let unit = height + spacing;
                if *item_count == 0 || unit <= 0.0 {
                    return None;
                }
                let index = fixed_index_at(position, unit, *item_count);
                if index >= *item_count {
                    return None;
                }
                if position < index as f32 * unit + height {
                    Location::Item(index)
                } else {
                    Location::Spacing { next: index + 1 }
                }
            }
            HeightStrategy::Variable {
                spacing,
                item_positions,
            } => {
                let count = item_positions.len() - 1;
                // First entry strictly after `position`; entry 0 is 0.0 so this is >= 1.
                let upper = item_positions.partition_point(|&p| p <= position);
                let index = upper - 1;
                if index >= count {
                    return None;
                }
                if position < item_positions[index + 1] - spacing {
                    Location::Item(index)
                } else {
                    Location::Spacing { next: index + 1 }
                }
            }
        };

        match location {
            Location::Spacing { next } if next >= self.item_count() => None,
            location => Some(location),
        }
    }

    fn first_index_at_or_after(&self, position: f32) -> Option<usize> {
        if position < 0.0 {
            return (self.item_count() > 0).then_some(0);
        }
        match self.locate(position)? {
            Location::Item(index) => Some(index),
            Location::Spacing { next } => Some(next),
        }
    }

    /// Number of items whose start position is strictly before `position`.
    fn count_items_starting_before(&self, position: f32) -> usize {
        match &self.strategy {
            HeightStrategy::Fixed {
                item_height,
                spacing,
                item_count,
            } => {
                if position <= 0.0 {
                    return 0;
                }
                let unit = item_height.unwrap_or(0.0) + spacing;
                if unit <= 0.0 {
                    return *item_count;
                }
                let mut n = cmp::min((position / unit) as usize, *item_count);
                while n > 0 && ((n - 1) as f32) * unit >= position {
                    n -= 1;
                }
                while n < *item_count && (n as f32) * unit < position {
                    n += 1;
                }
                n
            }
            HeightStrategy::Variable { item_positions, .. } => {
                let count = item_positions.len() - 1;
                item_positions[..count].partition_point(|&p| p < position)
            }
        }
    }
}

/// Index of the row whose start `index as f32 * unit` is the last one at or before `position`,
/// or `count` past the end. The division alone can land one row off at a boundary.
fn fixed_index_at(position: f32, unit: f32, count: usize) -> usize {
    let mut index = cmp::min((position / unit) as usize, count);
    while index > 0 && index as f32 * unit > position {
        index -= 1;
    }
    while index < count && (index + 1) as f32 * unit <= position {
        index += 1;
    }
    index
}

fn estimate_height<S, D>(binding: Binding<'_, S, D>, index: usize) -> f32
where
    S: DataSource + ?Sized,
    D: ItemDelegate<S::Data> + ?Sized,
{
    match binding.data_source.data_at(index) {
        Some(data) => sanitize(binding.delegate.estimate_item_height(index, &data)),
        None => {
            vwarn!(index, "estimate_height: data source has no data at index");
            0.0
        }
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        vwarn!(value, "ignoring negative or non-finite delegate value");
        0.0
    }
}
