use alloc::vec::Vec;
use core::cmp;

use crate::error::{Error, Result};
use crate::host::{DataSource, Host, ItemDelegate, ScrollViewport, VisualItem};
use crate::visible::LayoutContext;
use crate::{
    Align, ItemGeometry, ItemHeightManager, ItemRange, ListOptions, SelectionChange,
    SelectionChangeReason, SelectionMode, SelectionStore, VisibleItemManager,
};

/// A change notification from the data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataChange {
    Added { index: usize, count: usize },
    Removed { index: usize, count: usize },
    Updated { index: usize, count: usize },
    Moved { previous_index: usize, new_index: usize },
}

/// A virtualized list: item geometry, selection and the window of live visual items.
///
/// `ListView` owns no host objects. Every call that touches the data source, the delegate or
/// the viewport borrows them through a [`Host`] for the duration of the call.
///
/// Notifications must be delivered in the order they happened. Each one is applied to the
/// height table first, then to the selection, then to the live window, and the content height
/// is re-reported to the viewport.
pub struct ListView<I> {
    options: ListOptions,
    heights: ItemHeightManager,
    selection: SelectionStore,
    visible: VisibleItemManager<I>,
}

impl<I: core::fmt::Debug> core::fmt::Debug for ListView<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListView")
            .field("options", &self.options)
            .field("heights", &self.heights)
            .field("selection", &self.selection)
            .field("visible", &self.visible)
            .finish()
    }
}

impl<I> Default for ListView<I> {
    fn default() -> Self {
        Self::new(ListOptions::default())
    }
}

impl<I> ListView<I> {
    pub fn new(options: ListOptions) -> Self {
        Self {
            visible: VisibleItemManager::new(options.lookahead),
            heights: ItemHeightManager::new(),
            selection: SelectionStore::new(),
            options,
        }
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn heights(&self) -> &ItemHeightManager {
        &self.heights
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn item_count(&self) -> usize {
        self.heights.item_count()
    }

    pub fn total_height(&self) -> f32 {
        self.heights.total_height()
    }

    /// Returns `(0, 0)` for an out-of-range index.
    pub fn item_geometry(&self, index: usize) -> ItemGeometry {
        self.heights.item_geometry(index)
    }

    pub fn try_item_geometry(&self, index: usize) -> Result<ItemGeometry> {
        let count = self.heights.item_count();
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        Ok(self.heights.item_geometry(index))
    }

    /// Hit-tests a content y-coordinate. `None` between items and outside the content.
    pub fn item_index_at_position(&self, position: f32) -> Option<usize> {
        self.heights.item_index(position)
    }

    pub fn visible_range(&self) -> ItemRange {
        self.visible.visible_range()
    }

    pub fn visible_item(&self, index: usize) -> Option<&I> {
        self.visible.visible_item(index)
    }

    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &I)> + '_ {
        self.visible.visible_items()
    }

    /// Computes the scroll offset that brings `index` into view.
    ///
    /// The offset is clamped to `0..=total_height - viewport_height`. Returns `None` for an
    /// out-of-range index.
    pub fn scroll_offset_for_item<V>(&self, index: usize, align: Align, viewport: &V) -> Option<f32>
    where
        V: ScrollViewport<I> + ?Sized,
    {
        if index >= self.heights.item_count() {
            return None;
        }
        let item = self.heights.item_geometry(index);
        let rect = viewport.visible_content_rect();
        let view = rect.height.max(0.0);
        let current = rect.y;

        let target = match align {
            Align::Start => item.position,
            Align::End => item.end() - view,
            Align::Center => item.position + item.height / 2.0 - view / 2.0,
            Align::Auto => {
                if item.position >= current && item.end() <= current + view {
                    current
                } else if item.position < current {
                    item.position
                } else {
                    item.end() - view
                }
            }
        };

        let max = (self.heights.total_height() - view).max(0.0);
        Some(target.clamp(0.0, max))
    }

    // ===== Selection queries =====

    pub fn is_item_selected(&self, index: usize) -> bool {
        self.selection.is_index_selected(index)
    }

    pub fn first_selected_item_index(&self) -> Option<usize> {
        self.selection.first_selected_index()
    }

    pub fn selected_item_indexes(&self) -> Vec<usize> {
        self.selection.all_selected_indexes()
    }

    pub fn selected_item_count(&self) -> usize {
        self.selection.all_selected_count()
    }

    fn report_content_height<V>(&self, viewport: &mut V)
    where
        V: ScrollViewport<I> + ?Sized,
    {
        let height = self.heights.total_height();
        viewport.set_content_height(height);
        if self.options.auto_adjust_height {
            viewport.set_fixed_height(height);
        }
    }

    fn notify_selection_change(&self, change: SelectionChange) {
        if let Some(cb) = &self.options.on_selection_change {
            cb(&self.selection, change);
        }
    }
}

impl<I: VisualItem> ListView<I> {
    pub fn set_options(&mut self, options: ListOptions) {
        let previous_mode = self.options.selection_mode;
        self.options = options;
        self.visible.set_lookahead(self.options.lookahead);
        if self.options.selection_mode != previous_mode {
            self.restrict_selection_to_mode();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ListOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// Rebuilds everything from the host: heights, an empty selection and a fresh window.
    ///
    /// Call this after installing or swapping the data source or the delegate.
    pub fn reload<S, D, V>(&mut self, host: &mut Host<'_, S, D, V>)
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let binding = host.binding();
        self.heights.reload(binding);
        let had_selection = self.selection.clear();
        vdebug!(
            count = self.heights.item_count(),
            bound = binding.is_some(),
            "ListView::reload"
        );

        self.visible.clear(&mut *host.viewport);
        self.report_content_height(&mut *host.viewport);
        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible.update_visible_items(&mut cx);

        if had_selection {
            self.notify_selection_change(SelectionChange::new(
                SelectionChangeReason::ReplaceSelection,
                ItemRange::new(0, 0),
            ));
        }
    }

    /// Reconciles the live window with the current viewport (scroll or resize).
    pub fn update_visible_items<S, D, V>(&mut self, host: &mut Host<'_, S, D, V>)
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let binding = host.binding();
        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible.update_visible_items(&mut cx);
    }

    pub fn apply_data_change<S, D, V>(&mut self, host: &mut Host<'_, S, D, V>, change: DataChange)
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        match change {
            DataChange::Added { index, count } => self.on_data_added(host, index, count),
            DataChange::Removed { index, count } => self.on_data_removed(host, index, count),
            DataChange::Updated { index, count } => self.on_data_updated(host, index, count),
            DataChange::Moved {
                previous_index,
                new_index,
            } => self.on_data_moved(host, previous_index, new_index),
        }
    }

    /// `count` items were inserted at `index` in the data source.
    pub fn on_data_added<S, D, V>(
        &mut self,
        host: &mut Host<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        if count == 0 {
            return;
        }
        let index = cmp::min(index, self.heights.item_count());
        vtrace!(index, count, "ListView::on_data_added");

        let binding = host.binding();
        self.heights.on_data_added(index, count, binding);
        self.selection.adjust_selection_by_adding_indexes(index, count);
        self.report_content_height(&mut *host.viewport);

        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible.handle_data_added(&mut cx, index, count);
    }

    /// `count` items were removed at `index` from the data source.
    pub fn on_data_removed<S, D, V>(
        &mut self,
        host: &mut Host<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let removed = ItemRange::new(index, count).clamp_to(self.heights.item_count());
        if removed.is_empty() {
            return;
        }
        vtrace!(index = removed.index, count = removed.count, "ListView::on_data_removed");

        let binding = host.binding();
        self.heights.on_data_removed(removed.index, removed.count);
        let dropped = self
            .selection
            .adjust_selection_by_removing_indexes(removed.index, removed.count);
        self.report_content_height(&mut *host.viewport);

        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible
            .handle_data_removed(&mut cx, removed.index, removed.count);

        if dropped {
            self.notify_selection_change(SelectionChange::new(
                SelectionChangeReason::Refresh,
                removed,
            ));
        }
    }

    /// The data of `count` items at `index` changed; their heights may have too.
    pub fn on_data_updated<S, D, V>(
        &mut self,
        host: &mut Host<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let updated = ItemRange::new(index, count).clamp_to(self.heights.item_count());
        if updated.is_empty() {
            return;
        }
        vtrace!(index = updated.index, count = updated.count, "ListView::on_data_updated");

        let binding = host.binding();
        let height_difference = self
            .heights
            .on_data_updated(updated.index, updated.count, binding);
        if height_difference != 0.0 {
            self.report_content_height(&mut *host.viewport);
        }

        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible
            .handle_data_updated(&mut cx, updated.index, updated.count, height_difference);
    }

    /// One item moved from `previous_index` to `new_index`. Its selection state moves with it.
    pub fn on_data_moved<S, D, V>(
        &mut self,
        host: &mut Host<'_, S, D, V>,
        previous_index: usize,
        new_index: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let count = self.heights.item_count();
        if previous_index >= count || new_index >= count || previous_index == new_index {
            return;
        }
        vtrace!(previous_index, new_index, "ListView::on_data_moved");

        let binding = host.binding();
        self.heights
            .on_data_moved(previous_index, new_index, binding);

        let was_selected = self.selection.is_index_selected(previous_index);
        self.selection
            .adjust_selection_by_removing_indexes(previous_index, 1);
        self.selection.adjust_selection_by_adding_indexes(new_index, 1);
        if was_selected {
            self.selection.add_selection(new_index, 1);
        }
        self.report_content_height(&mut *host.viewport);

        let mut cx = LayoutContext::new(
            &self.heights,
            &self.selection,
            binding,
            &mut *host.viewport,
        );
        self.visible
            .handle_data_moved(&mut cx, previous_index, new_index);
        self.visible.change_selection(
            &self.selection,
            SelectionChange::new(SelectionChangeReason::Refresh, ItemRange::new(0, 0)),
        );
    }

    // ===== Selection operations =====

    /// Selects `index`. In single mode this replaces the current selection.
    pub fn select_item_at_index(&mut self, index: usize) {
        if index >= self.heights.item_count() {
            return;
        }
        match self.options.selection_mode {
            SelectionMode::None => {}
            SelectionMode::Single => {
                self.apply_selection(SelectionChangeReason::ReplaceSelection, index, 1);
            }
            SelectionMode::SimpleMultiple | SelectionMode::ExtendedMultiple => {
                self.apply_selection(SelectionChangeReason::AddSelection, index, 1);
            }
        }
    }

    pub fn unselect_item_at_index(&mut self, index: usize) {
        if self.options.selection_mode == SelectionMode::None {
            return;
        }
        self.apply_selection(SelectionChangeReason::RemoveSelection, index, 1);
    }

    /// Flips the selection state of `index` and returns the new state.
    pub fn toggle_item_at_index(&mut self, index: usize) -> bool {
        if self.options.selection_mode == SelectionMode::None
            || index >= self.heights.item_count()
        {
            return false;
        }
        if self.selection.is_index_selected(index) {
            self.apply_selection(SelectionChangeReason::RemoveSelection, index, 1);
            false
        } else {
            self.select_item_at_index(index);
            true
        }
    }

    /// Adds `index..index + count` to the selection. Only honored by the multiple modes.
    pub fn select_range(&mut self, index: usize, count: usize) {
        if !self.options.selection_mode.allows_multiple() {
            return;
        }
        self.apply_selection(SelectionChangeReason::AddSelection, index, count);
    }

    /// Selects every item. Only honored by the multiple modes.
    pub fn select_all_items(&mut self) {
        if !self.options.selection_mode.allows_multiple() {
            return;
        }
        let count = self.heights.item_count();
        self.apply_selection(SelectionChangeReason::ReplaceSelection, 0, count);
    }

    pub fn unselect_all_items(&mut self) {
        self.apply_selection(SelectionChangeReason::ReplaceSelection, 0, 0);
    }

    pub fn set_selection_mode(&mut self, selection_mode: SelectionMode) {
        if self.options.selection_mode == selection_mode {
            return;
        }
        self.options.selection_mode = selection_mode;
        self.restrict_selection_to_mode();
    }

    fn restrict_selection_to_mode(&mut self) {
        match self.options.selection_mode {
            SelectionMode::None => {
                self.apply_selection(SelectionChangeReason::ReplaceSelection, 0, 0);
            }
            SelectionMode::Single => {
                if self.selection.all_selected_count() > 1 {
                    if let Some(first) = self.selection.first_selected_index() {
                        self.apply_selection(SelectionChangeReason::ReplaceSelection, first, 1);
                    }
                }
            }
            SelectionMode::SimpleMultiple | SelectionMode::ExtendedMultiple => {}
        }
    }

    fn apply_selection(&mut self, reason: SelectionChangeReason, index: usize, count: usize) {
        let range = ItemRange::new(index, count).clamp_to(self.heights.item_count());
        let changed = match reason {
            SelectionChangeReason::AddSelection => {
                self.selection.add_selection(range.index, range.count)
            }
            SelectionChangeReason::RemoveSelection => {
                self.selection.remove_selection(range.index, range.count)
            }
            SelectionChangeReason::ReplaceSelection => {
                self.selection.replace_selection(range.index, range.count)
            }
            SelectionChangeReason::Refresh => true,
        };
        if !changed {
            return;
        }

        let change = SelectionChange::new(reason, range);
        vtrace!(?reason, index = range.index, count = range.count, "selection changed");
        self.visible.change_selection(&self.selection, change);
        self.notify_selection_change(change);
    }
}
