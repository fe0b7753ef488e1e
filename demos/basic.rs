// Example: a million fixed-height rows, scrolling and scroll-to-item.
use list_virtualizer::{
    Align, DataSource, Host, ItemDelegate, ListOptions, ListView, Rect, ScrollViewport,
    SelectionMode, VisualItem,
};

struct Numbers(usize);

impl DataSource for Numbers {
    type Data = usize;

    fn data_count(&self) -> usize {
        self.0
    }

    fn data_at(&self, index: usize) -> Option<usize> {
        (index < self.0).then_some(index)
    }
}

#[derive(Debug, Default)]
struct Label {
    rect: Rect,
    selected: bool,
    text: String,
}

impl VisualItem for Label {
    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    fn set_is_selected(&mut self, is_selected: bool) {
        self.selected = is_selected;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }
}

struct Rows;

impl ItemDelegate<usize> for Rows {
    type Item = Label;

    fn estimate_item_height(&self, _index: usize, _data: &usize) -> f32 {
        20.0
    }

    fn item_spacing(&self) -> f32 {
        1.0
    }

    fn create_item(&self, _index: usize, _data: &usize) -> Label {
        Label::default()
    }

    fn item_text(&self, _index: usize, data: &usize) -> String {
        format!("row #{data}")
    }
}

struct Viewport {
    rect: Rect,
    children: usize,
    content_height: f32,
}

impl ScrollViewport<Label> for Viewport {
    fn visible_content_rect(&self) -> Rect {
        self.rect
    }

    fn content_width(&self) -> f32 {
        self.rect.width
    }

    fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    fn add_child(&mut self, _item: &Label) {
        self.children += 1;
    }

    fn remove_child(&mut self, _item: &Label) {
        self.children -= 1;
    }
}

fn main() {
    let source = Numbers(1_000_000);
    let delegate = Rows;
    let mut viewport = Viewport {
        rect: Rect::new(0.0, 0.0, 320.0, 240.0),
        children: 0,
        content_height: 0.0,
    };
    let mut list = ListView::new(ListOptions::new().with_selection_mode(SelectionMode::Single));

    list.reload(&mut Host::new(&source, &delegate, &mut viewport));
    println!("content_height={}", viewport.content_height);
    println!("visible_range={:?} live={}", list.visible_range(), viewport.children);

    list.select_item_at_index(500_000);
    let offset = list
        .scroll_offset_for_item(500_000, Align::Center, &viewport)
        .unwrap_or(0.0);
    viewport.rect.y = offset;
    list.update_visible_items(&mut Host::new(&source, &delegate, &mut viewport));

    println!("after scroll_to_item: offset={offset}");
    println!("visible_range={:?} live={}", list.visible_range(), viewport.children);
    if let Some(label) = list.visible_item(500_000) {
        println!(
            "selected row: text={:?} y={} selected={}",
            label.text, label.rect.y, label.selected
        );
    }
    println!("row at y={offset}: {:?}", list.item_index_at_position(offset));
}
