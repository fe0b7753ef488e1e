// Example: variable-height rows patched in place as the data changes.
use std::cell::Cell;

use list_virtualizer::{
    DataChange, DataSource, Host, ItemDelegate, ListOptions, ListView, Rect, ScrollViewport,
    SelectionMode, SelectionStore, VisualItem,
};

struct Messages(Vec<String>);

impl DataSource for Messages {
    type Data = String;

    fn data_count(&self) -> usize {
        self.0.len()
    }

    fn data_at(&self, index: usize) -> Option<String> {
        self.0.get(index).cloned()
    }
}

#[derive(Debug)]
struct Bubble {
    text: String,
    rect: Rect,
    selected: bool,
}

impl VisualItem for Bubble {
    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    fn set_is_selected(&mut self, is_selected: bool) {
        self.selected = is_selected;
    }
}

#[derive(Default)]
struct Chat {
    created: Cell<usize>,
}

impl ItemDelegate<String> for Chat {
    type Item = Bubble;

    fn has_variable_item_height(&self) -> bool {
        true
    }

    // One 16px line per 24 characters.
    fn estimate_item_height(&self, _index: usize, data: &String) -> f32 {
        16.0 * data.len().div_ceil(24).max(1) as f32
    }

    fn item_spacing(&self) -> f32 {
        4.0
    }

    fn create_item(&self, _index: usize, data: &String) -> Bubble {
        self.created.set(self.created.get() + 1);
        Bubble {
            text: data.clone(),
            rect: Rect::default(),
            selected: false,
        }
    }
}

#[derive(Default)]
struct Viewport {
    rect: Rect,
    live: usize,
    batches: usize,
}

impl ScrollViewport<Bubble> for Viewport {
    fn visible_content_rect(&self) -> Rect {
        self.rect
    }

    fn content_width(&self) -> f32 {
        self.rect.width
    }

    fn set_content_height(&mut self, _height: f32) {}

    fn add_child(&mut self, _item: &Bubble) {
        self.live += 1;
    }

    fn remove_child(&mut self, _item: &Bubble) {
        self.live -= 1;
    }

    fn end_update(&mut self) {
        self.batches += 1;
    }
}

fn dump(list: &ListView<Bubble>) {
    for (index, bubble) in list.visible_items() {
        println!(
            "  [{index}] y={:>5} h={:>3} sel={} {:?}",
            bubble.rect.y, bubble.rect.height, bubble.selected, bubble.text
        );
    }
}

fn main() {
    let mut data = Messages(
        (0..50)
            .map(|i| "lorem ipsum ".repeat(i % 5 + 1).trim_end().to_owned())
            .collect(),
    );
    let delegate = Chat::default();
    let mut viewport = Viewport {
        rect: Rect::new(0.0, 0.0, 200.0, 120.0),
        ..Viewport::default()
    };
    let options = ListOptions::new()
        .with_lookahead(1)
        .with_selection_mode(SelectionMode::ExtendedMultiple)
        .with_on_selection_change(Some(|store: &SelectionStore, change| {
            println!("selection {change:?} -> {:?}", store.all_selected_indexes());
        }));
    let mut list = ListView::new(options);

    list.reload(&mut Host::new(&data, &delegate, &mut viewport));
    list.select_range(1, 2);
    println!("initial (total_height={}):", list.total_height());
    dump(&list);

    data.0.insert(0, "a new message at the top".to_owned());
    list.apply_data_change(
        &mut Host::new(&data, &delegate, &mut viewport),
        DataChange::Added { index: 0, count: 1 },
    );
    println!("after insert at 0:");
    dump(&list);

    data.0[2] = "edited: ".repeat(10);
    list.apply_data_change(
        &mut Host::new(&data, &delegate, &mut viewport),
        DataChange::Updated { index: 2, count: 1 },
    );
    println!("after update of 2:");
    dump(&list);

    let moved = data.0.remove(3);
    data.0.insert(0, moved);
    list.apply_data_change(
        &mut Host::new(&data, &delegate, &mut viewport),
        DataChange::Moved {
            previous_index: 3,
            new_index: 0,
        },
    );
    println!("after move 3 -> 0:");
    dump(&list);

    data.0.drain(0..2);
    list.apply_data_change(
        &mut Host::new(&data, &delegate, &mut viewport),
        DataChange::Removed { index: 0, count: 2 },
    );
    println!("after removing 0..2:");
    dump(&list);

    println!(
        "items created={} live={} batches={}",
        delegate.created.get(),
        viewport.live,
        viewport.batches
    );
}
