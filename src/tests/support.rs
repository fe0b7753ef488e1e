use crate::*;

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Lcg(u64);

impl Lcg {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    pub(crate) fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    pub(crate) fn gen_height(&mut self) -> f32 {
        self.gen_range_usize(1, 40) as f32
    }
}

/// One row of test data: a stable identity and the height the delegate reports for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Row {
    pub key: u32,
    pub height: f32,
}

#[derive(Debug, Default)]
pub(crate) struct TestSource {
    pub rows: Vec<Row>,
    next_key: u32,
}

impl TestSource {
    pub(crate) fn with_heights(heights: &[f32]) -> Self {
        let mut source = Self::default();
        source.rows = source.make_rows(heights);
        source
    }

    pub(crate) fn make_rows(&mut self, heights: &[f32]) -> Vec<Row> {
        heights
            .iter()
            .map(|&height| {
                self.next_key += 1;
                Row {
                    key: self.next_key,
                    height,
                }
            })
            .collect()
    }
}

impl DataSource for TestSource {
    type Data = Row;

    fn data_count(&self) -> usize {
        self.rows.len()
    }

    fn data_at(&self, index: usize) -> Option<Row> {
        self.rows.get(index).copied()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ItemState {
    pub key: u32,
    pub rect: Rect,
    pub selected: bool,
    pub text: String,
    pub loaded: bool,
}

/// A visual item whose state stays observable after it was handed to the viewport.
#[derive(Clone, Debug)]
pub(crate) struct TestItem {
    pub id: u64,
    pub state: Rc<RefCell<ItemState>>,
}

impl VisualItem for TestItem {
    fn set_rect(&mut self, rect: Rect) {
        self.state.borrow_mut().rect = rect;
    }

    fn set_is_selected(&mut self, is_selected: bool) {
        self.state.borrow_mut().selected = is_selected;
    }

    fn set_text(&mut self, text: &str) {
        self.state.borrow_mut().text = text.into();
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestDelegate {
    pub variable: bool,
    pub spacing: f32,
    pub created: Cell<u64>,
}

impl TestDelegate {
    pub(crate) fn new(variable: bool, spacing: f32) -> Self {
        Self {
            variable,
            spacing,
            created: Cell::new(0),
        }
    }
}

impl ItemDelegate<Row> for TestDelegate {
    type Item = TestItem;

    fn has_variable_item_height(&self) -> bool {
        self.variable
    }

    fn estimate_item_height(&self, _index: usize, data: &Row) -> f32 {
        data.height
    }

    fn item_spacing(&self) -> f32 {
        self.spacing
    }

    fn create_item(&self, _index: usize, data: &Row) -> TestItem {
        let id = self.created.get() + 1;
        self.created.set(id);
        TestItem {
            id,
            state: Rc::new(RefCell::new(ItemState {
                key: data.key,
                ..ItemState::default()
            })),
        }
    }

    fn item_text(&self, index: usize, _data: &Row) -> String {
        format!("item {index}")
    }

    fn load_item(&self, item: &mut TestItem, _index: usize, _data: &Row) {
        item.state.borrow_mut().loaded = true;
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestViewport {
    pub rect: Rect,
    pub width: f32,
    pub content_height: f32,
    pub fixed_height: Option<f32>,
    pub children: Vec<u64>,
    pub added: usize,
    pub removed: usize,
    pub depth: usize,
    pub batches: usize,
    /// Child changes made outside of a `begin_update`/`end_update` bracket.
    pub unbatched: usize,
}

impl TestViewport {
    pub(crate) fn new(height: f32) -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 100.0, height),
            width: 100.0,
            ..Self::default()
        }
    }
}

impl ScrollViewport<TestItem> for TestViewport {
    fn visible_content_rect(&self) -> Rect {
        self.rect
    }

    fn content_width(&self) -> f32 {
        self.width
    }

    fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    fn set_fixed_height(&mut self, height: f32) {
        self.fixed_height = Some(height);
    }

    fn add_child(&mut self, item: &TestItem) {
        assert!(!self.children.contains(&item.id), "item {} added twice", item.id);
        if self.depth == 0 {
            self.unbatched += 1;
        }
        self.children.push(item.id);
        self.added += 1;
    }

    fn remove_child(&mut self, item: &TestItem) {
        let pos = self
            .children
            .iter()
            .position(|&id| id == item.id)
            .unwrap_or_else(|| panic!("item {} removed but never added", item.id));
        if self.depth == 0 {
            self.unbatched += 1;
        }
        self.children.swap_remove(pos);
        self.removed += 1;
    }

    fn begin_update(&mut self) {
        self.depth += 1;
    }

    fn end_update(&mut self) {
        assert!(self.depth > 0, "end_update without begin_update");
        self.depth -= 1;
        if self.depth == 0 {
            self.batches += 1;
        }
    }
}

/// A list wired to recording collaborators.
pub(crate) struct Fixture {
    pub source: TestSource,
    pub delegate: TestDelegate,
    pub viewport: TestViewport,
    pub list: ListView<TestItem>,
}

impl Fixture {
    pub(crate) fn new(heights: &[f32], variable: bool, spacing: f32, viewport_height: f32) -> Self {
        Self::with_options(
            heights,
            variable,
            spacing,
            viewport_height,
            ListOptions::default(),
        )
    }

    pub(crate) fn with_options(
        heights: &[f32],
        variable: bool,
        spacing: f32,
        viewport_height: f32,
        options: ListOptions,
    ) -> Self {
        let mut f = Self {
            source: TestSource::with_heights(heights),
            delegate: TestDelegate::new(variable, spacing),
            viewport: TestViewport::new(viewport_height),
            list: ListView::new(options),
        };
        f.reload();
        f
    }

    pub(crate) fn reload(&mut self) {
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.reload(&mut host);
    }

    pub(crate) fn scroll_to(&mut self, y: f32) {
        self.viewport.rect.y = y;
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.update_visible_items(&mut host);
    }

    pub(crate) fn insert(&mut self, index: usize, heights: &[f32]) {
        let rows = self.source.make_rows(heights);
        self.source.rows.splice(index..index, rows);
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.on_data_added(&mut host, index, heights.len());
    }

    pub(crate) fn remove(&mut self, index: usize, count: usize) {
        self.source.rows.drain(index..index + count);
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.on_data_removed(&mut host, index, count);
    }

    /// Replaces the rows at `index` with fresh data of the given heights.
    pub(crate) fn update(&mut self, index: usize, heights: &[f32]) {
        let rows = self.source.make_rows(heights);
        self.source.rows.splice(index..index + heights.len(), rows);
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.on_data_updated(&mut host, index, heights.len());
    }

    pub(crate) fn move_item(&mut self, from: usize, to: usize) {
        let row = self.source.rows.remove(from);
        self.source.rows.insert(to, row);
        let mut host = Host::new(&self.source, &self.delegate, &mut self.viewport);
        self.list.on_data_moved(&mut host, from, to);
    }

    pub(crate) fn visible_keys(&self) -> Vec<u32> {
        self.list
            .visible_items()
            .map(|(_, item)| item.state.borrow().key)
            .collect()
    }

    /// The window a from-scratch computation would produce for the current viewport.
    pub(crate) fn expected_window(&self) -> ItemRange {
        let rect = self.viewport.rect;
        let count = self.source.rows.len();
        if rect.height <= 0.0 {
            return ItemRange::new(0, 0);
        }
        let (top, bottom) = (rect.top(), rect.bottom());
        let first = (0..count)
            .find(|&i| self.list.item_geometry(i).end() > top)
            .unwrap_or(count);
        let end = (0..count)
            .filter(|&i| self.list.item_geometry(i).position < bottom)
            .count()
            .max(first);
        let lookahead = self.list.options().lookahead;
        ItemRange::from(first.saturating_sub(lookahead)..(end + lookahead).min(count))
    }

    /// Checks every invariant that ties the window, the viewport and the data together.
    pub(crate) fn assert_consistent(&self) {
        let window = self.list.visible_range();
        let expected = self.expected_window();
        if expected.is_empty() {
            assert!(window.is_empty(), "window {window:?} should be empty");
        } else {
            assert_eq!(window, expected, "window does not match viewport");
        }

        assert_eq!(self.viewport.depth, 0, "unbalanced update bracket");
        assert_eq!(self.viewport.unbatched, 0, "child changes outside a batch");
        assert_eq!(self.viewport.children.len(), window.count);
        assert_eq!(self.viewport.content_height, self.list.total_height());
        assert_eq!(self.list.item_count(), self.source.rows.len());

        for (index, item) in self.list.visible_items() {
            assert!(self.viewport.children.contains(&item.id));
            let state = item.state.borrow();
            assert_eq!(state.key, self.source.rows[index].key, "wrong data at {index}");
            let geometry = self.list.item_geometry(index);
            assert_eq!(state.rect.y, geometry.position, "wrong y at {index}");
            assert_eq!(state.rect.height, geometry.height, "wrong height at {index}");
            assert_eq!(state.rect.width, self.viewport.width);
            assert_eq!(state.selected, self.list.is_item_selected(index));
            assert!(state.loaded);
        }
    }
}
