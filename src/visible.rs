use alloc::collections::VecDeque;
use core::cmp;

use crate::host::{Binding, DataSource, ItemDelegate, ScrollViewport, UpdateGuard, VisualItem};
use crate::range::calculate_range_difference;
use crate::{
    ItemHeightManager, ItemRange, Rect, SelectionChange, SelectionChangeReason, SelectionStore,
};

/// Everything the visible window needs for one layout pass.
pub struct LayoutContext<'a, S: ?Sized, D: ?Sized, V: ?Sized> {
    pub heights: &'a ItemHeightManager,
    pub selection: &'a SelectionStore,
    pub binding: Option<Binding<'a, S, D>>,
    pub viewport: &'a mut V,
}

impl<'a, S: ?Sized, D: ?Sized, V: ?Sized> LayoutContext<'a, S, D, V> {
    pub fn new(
        heights: &'a ItemHeightManager,
        selection: &'a SelectionStore,
        binding: Option<Binding<'a, S, D>>,
        viewport: &'a mut V,
    ) -> Self {
        Self {
            heights,
            selection,
            binding,
            viewport,
        }
    }

    fn split<I>(&mut self) -> (ItemFactory<'_, S, D>, &mut V)
    where
        V: ScrollViewport<I>,
    {
        let factory = ItemFactory {
            heights: self.heights,
            selection: self.selection,
            binding: self.binding,
            width: self.viewport.content_width(),
        };
        (factory, &mut *self.viewport)
    }
}

struct ItemFactory<'a, S: ?Sized, D: ?Sized> {
    heights: &'a ItemHeightManager,
    selection: &'a SelectionStore,
    binding: Option<Binding<'a, S, D>>,
    width: f32,
}

impl<S, D> ItemFactory<'_, S, D>
where
    S: DataSource + ?Sized,
    D: ItemDelegate<S::Data> + ?Sized,
{
    fn create(&self, index: usize) -> Option<D::Item> {
        let binding = self.binding?;
        if index >= self.heights.item_count() {
            vwarn!(
                index,
                count = self.heights.item_count(),
                "create_item: index out of range"
            );
            return None;
        }
        let Some(data) = binding.data_source.data_at(index) else {
            vwarn!(index, "create_item: data source has no data at index");
            return None;
        };

        let delegate = binding.delegate;
        let mut item = delegate.create_item(index, &data);
        let text = delegate.item_text(index, &data);
        if !text.is_empty() {
            item.set_text(&text);
        }
        delegate.load_item(&mut item, index, &data);
        item.set_rect(item_rect(self.heights, index, self.width));
        item.set_is_selected(self.selection.is_index_selected(index));
        Some(item)
    }
}

fn item_rect(heights: &ItemHeightManager, index: usize, width: f32) -> Rect {
    let geometry = heights.item_geometry(index);
    Rect::new(0.0, geometry.position, width, geometry.height)
}

/// The sliding window of live visual items.
///
/// `visible_items[k]` always represents item `first_visible_item_index + k`, and its rectangle
/// matches the height table. Every structural change goes through one
/// [`UpdateGuard`] and touches only the items that enter or leave the window.
#[derive(Debug)]
pub struct VisibleItemManager<I> {
    first_visible_item_index: usize,
    visible_items: VecDeque<I>,
    lookahead: usize,
}

impl<I> Default for VisibleItemManager<I> {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_LOOKAHEAD)
    }
}

impl<I> VisibleItemManager<I> {
    pub fn new(lookahead: usize) -> Self {
        Self {
            first_visible_item_index: 0,
            visible_items: VecDeque::new(),
            lookahead,
        }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Takes effect on the next layout pass.
    pub fn set_lookahead(&mut self, lookahead: usize) {
        self.lookahead = lookahead;
    }

    pub fn first_visible_item_index(&self) -> usize {
        self.first_visible_item_index
    }

    pub fn len(&self) -> usize {
        self.visible_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_items.is_empty()
    }

    /// The index range currently backed by live items.
    pub fn visible_range(&self) -> ItemRange {
        ItemRange::new(self.first_visible_item_index, self.visible_items.len())
    }

    /// Returns the live item for `index`, if it is inside the window.
    pub fn visible_item(&self, index: usize) -> Option<&I> {
        let offset = index.checked_sub(self.first_visible_item_index)?;
        self.visible_items.get(offset)
    }

    pub fn visible_item_mut(&mut self, index: usize) -> Option<&mut I> {
        let offset = index.checked_sub(self.first_visible_item_index)?;
        self.visible_items.get_mut(offset)
    }

    /// Iterates live items together with the index they represent.
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &I)> + '_ {
        let first = self.first_visible_item_index;
        self.visible_items
            .iter()
            .enumerate()
            .map(move |(offset, item)| (first + offset, item))
    }

    /// The range that must be live for the current viewport, lookahead included.
    ///
    /// Only a degenerate viewport yields an empty range. A viewport that falls into a spacing gap
    /// or below the last item still keeps the neighbouring items live.
    pub fn visible_items_range<V>(&self, heights: &ItemHeightManager, viewport: &V) -> ItemRange
    where
        V: ScrollViewport<I> + ?Sized,
    {
        let rect = viewport.visible_content_rect();
        if !(rect.bottom() > rect.top()) {
            return ItemRange::new(0, 0);
        }

        let range = heights.item_range(rect.top(), rect.bottom());
        let start = range.index.saturating_sub(self.lookahead);
        let end = cmp::min(
            range.end().saturating_add(self.lookahead),
            heights.item_count(),
        );
        ItemRange::from(start..end)
    }

    /// Removes every live item.
    pub fn clear<V>(&mut self, viewport: &mut V)
    where
        V: ScrollViewport<I> + ?Sized,
    {
        if !self.visible_items.is_empty() {
            vdebug!(count = self.visible_items.len(), "VisibleItemManager::clear");
            let mut viewport = UpdateGuard::<I, _>::new(viewport);
            for item in self.visible_items.drain(..) {
                viewport.remove_child(&item);
            }
        }
        self.first_visible_item_index = 0;
    }
}

impl<I: VisualItem> VisibleItemManager<I> {
    /// Creates a fully bound live item for `index` without inserting it into the window.
    ///
    /// Returns `None` without a binding, for an index past the height table, or when the data
    /// source has no data at `index`.
    pub fn create_item<S, D, V>(
        &self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
    ) -> Option<I>
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let (factory, _) = cx.split::<I>();
        factory.create(index)
    }

    /// Recomputes the required window from the viewport and reconciles the live items with it.
    pub fn update_visible_items<S, D, V>(&mut self, cx: &mut LayoutContext<'_, S, D, V>)
    where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let new = self.visible_items_range(cx.heights, &*cx.viewport);
        let old = self.visible_range();
        let diff = calculate_range_difference(new, old);
        if diff.is_empty() {
            return;
        }
        vtrace!(
            new_index = new.index,
            new_count = new.count,
            old_index = old.index,
            old_count = old.count,
            "update_visible_items"
        );

        let (factory, viewport) = cx.split::<I>();
        let mut viewport = UpdateGuard::<I, _>::new(viewport);

        for _ in 0..diff.remove_head {
            if let Some(item) = self.visible_items.pop_front() {
                viewport.remove_child(&item);
            }
        }
        for _ in 0..diff.remove_tail {
            if let Some(item) = self.visible_items.pop_back() {
                viewport.remove_child(&item);
            }
        }
        self.first_visible_item_index += diff.remove_head;
        if self.visible_items.is_empty() {
            self.first_visible_item_index = new.index;
        }

        for index in diff.add_tail.indexes() {
            let Some(item) = factory.create(index) else {
                break;
            };
            viewport.add_child(&item);
            self.visible_items.push_back(item);
        }
        for index in diff.add_head.indexes().rev() {
            let Some(item) = factory.create(index) else {
                break;
            };
            viewport.add_child(&item);
            self.visible_items.push_front(item);
            self.first_visible_item_index = index;
        }
    }

    /// Patches the window after `count` items were inserted at `index`, then recomputes it.
    ///
    /// The height table must already include the insertion.
    pub fn handle_data_added<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        self.shift_for_added(cx, index, count);
        self.update_visible_items(cx);
    }

    /// Patches the window after `count` items were removed at `index`, then recomputes it.
    ///
    /// The height table must already exclude the removed items.
    pub fn handle_data_removed<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        self.shift_for_removed(cx, index, count);
        self.update_visible_items(cx);
    }

    /// Rebinds live items in `index..index + count` and moves the items after them by
    /// `height_difference`, then recomputes the window.
    ///
    /// Every live item in the updated range is destroyed and recreated, whether or not its
    /// height changed.
    pub fn handle_data_updated<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
        count: usize,
        height_difference: f32,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let updated = ItemRange::new(index, count);
        if height_difference != 0.0 {
            let from = updated
                .end()
                .saturating_sub(self.first_visible_item_index);
            self.reposition_items(cx.heights, cx.viewport.content_width(), from);
        }

        if let Some(overlap) = updated.intersection(&self.visible_range()) {
            vtrace!(
                index = overlap.index,
                count = overlap.count,
                "handle_data_updated: recreating live items"
            );
            let (factory, viewport) = cx.split::<I>();
            let mut viewport = UpdateGuard::<I, _>::new(viewport);
            for index in overlap.indexes() {
                let offset = index - self.first_visible_item_index;
                viewport.remove_child(&self.visible_items[offset]);
                match factory.create(index) {
                    Some(item) => {
                        viewport.add_child(&item);
                        self.visible_items[offset] = item;
                    }
                    None => {
                        // The item at `offset` is already detached.
                        let mut rest = self.visible_items.drain(offset..);
                        rest.next();
                        for item in rest {
                            viewport.remove_child(&item);
                        }
                        break;
                    }
                }
            }
        }

        self.update_visible_items(cx);
    }

    /// Patches the window after one item moved from `previous_index` to `new_index`.
    ///
    /// Handled as a removal at the old index followed by an insertion at the new one, after
    /// which every live item is re-placed from the height table.
    pub fn handle_data_moved<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        previous_index: usize,
        new_index: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        self.shift_for_removed(cx, previous_index, 1);
        self.shift_for_added(cx, new_index, 1);
        self.reposition_items(cx.heights, cx.viewport.content_width(), 0);
        self.update_visible_items(cx);
    }

    /// Pushes the selection state to live items.
    ///
    /// Add/remove changes touch only the live items inside the changed range; replace and
    /// refresh changes re-evaluate the whole window.
    pub fn change_selection(&mut self, selection: &SelectionStore, change: SelectionChange) {
        let first = self.first_visible_item_index;
        match change.reason {
            SelectionChangeReason::AddSelection | SelectionChangeReason::RemoveSelection => {
                let is_selected = change.reason == SelectionChangeReason::AddSelection;
                let Some(overlap) = change.range.intersection(&self.visible_range()) else {
                    return;
                };
                for index in overlap.indexes() {
                    self.visible_items[index - first].set_is_selected(is_selected);
                }
            }
            SelectionChangeReason::ReplaceSelection => {
                for (offset, item) in self.visible_items.iter_mut().enumerate() {
                    item.set_is_selected(change.range.contains(first + offset));
                }
            }
            SelectionChangeReason::Refresh => {
                for (offset, item) in self.visible_items.iter_mut().enumerate() {
                    item.set_is_selected(selection.is_index_selected(first + offset));
                }
            }
        }
    }

    fn shift_for_added<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let window = self.visible_range();
        if count == 0 || index >= window.end() {
            return;
        }

        let width = cx.viewport.content_width();
        if index <= window.index {
            vtrace!(index, count, "handle_data_added: before window");
            self.first_visible_item_index += count;
            self.reposition_items(cx.heights, width, 0);
            return;
        }

        let offset = index - window.index;
        let remaining = window.count - offset;
        let (factory, viewport) = cx.split::<I>();
        let mut viewport = UpdateGuard::<I, _>::new(viewport);

        if count >= remaining {
            vtrace!(index, count, remaining, "handle_data_added: dropping window tail");
            for item in self.visible_items.drain(offset..) {
                viewport.remove_child(&item);
            }
            return;
        }

        vtrace!(index, count, "handle_data_added: splicing into window");
        for k in 0..count {
            match factory.create(index + k) {
                Some(item) => {
                    viewport.add_child(&item);
                    self.visible_items.insert(offset + k, item);
                }
                None => {
                    for item in self.visible_items.drain(offset + k..) {
                        viewport.remove_child(&item);
                    }
                    return;
                }
            }
        }
        drop(viewport);
        self.reposition_items(factory.heights, factory.width, offset + count);
    }

    fn shift_for_removed<S, D, V>(
        &mut self,
        cx: &mut LayoutContext<'_, S, D, V>,
        index: usize,
        count: usize,
    ) where
        S: DataSource + ?Sized,
        D: ItemDelegate<S::Data, Item = I> + ?Sized,
        V: ScrollViewport<I> + ?Sized,
    {
        let window = self.visible_range();
        let removed = ItemRange::new(index, count);
        if count == 0 || index >= window.end() {
            return;
        }

        let width = cx.viewport.content_width();
        if removed.end() <= window.index {
            vtrace!(index, count, "handle_data_removed: before window");
            self.first_visible_item_index -= count;
            self.reposition_items(cx.heights, width, 0);
            return;
        }

        let Some(overlap) = removed.intersection(&window) else {
            // Empty window straddled by the removal.
            self.first_visible_item_index = index;
            return;
        };

        vtrace!(
            index = overlap.index,
            count = overlap.count,
            "handle_data_removed: erasing live items"
        );
        let from = overlap.index - window.index;
        {
            let mut viewport = UpdateGuard::<I, _>::new(&mut *cx.viewport);
            for item in self.visible_items.drain(from..from + overlap.count) {
                viewport.remove_child(&item);
            }
        }
        if index < window.index {
            self.first_visible_item_index = index;
        }
        self.reposition_items(cx.heights, width, from);
    }

    /// Re-places live items from `offset` on using the height table.
    fn reposition_items(&mut self, heights: &ItemHeightManager, width: f32, offset: usize) {
        let first = self.first_visible_item_index;
        for (k, item) in self.visible_items.iter_mut().enumerate().skip(offset) {
            item.set_rect(item_rect(heights, first + k, width));
        }
    }
}
