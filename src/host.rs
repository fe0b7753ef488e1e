//! Contracts between the engine and the host UI layer.
//!
//! The engine never owns the data source or the delegate. Every call that needs them takes a
//! [`Binding`] (or a [`Host`], which additionally carries the viewport) borrowed for the
//! duration of that call. An absent binding is a normal transient state and makes every
//! consumer degrade to an empty result.

use alloc::string::String;
use core::ops::{Deref, DerefMut};

use crate::Rect;

/// The item collection. Indexes are `0..data_count()`.
pub trait DataSource {
    /// Per-item payload handed to the delegate. Hosts typically use a cheap handle
    /// (`Rc`, `Arc`, an id, a borrowed reference).
    type Data;

    fn data_count(&self) -> usize;

    /// Returns `None` for an index the source no longer has.
    fn data_at(&self, index: usize) -> Option<Self::Data>;
}

/// Per-item geometry and visual-item construction.
pub trait ItemDelegate<T> {
    type Item: VisualItem;

    /// Decided once per reload.
    fn has_variable_item_height(&self) -> bool {
        false
    }

    fn estimate_item_height(&self, index: usize, data: &T) -> f32;

    fn item_spacing(&self) -> f32 {
        0.0
    }

    fn create_item(&self, index: usize, data: &T) -> Self::Item;

    /// Text applied to a freshly created item. Empty text is not applied.
    fn item_text(&self, _index: usize, _data: &T) -> String {
        String::new()
    }

    /// Finishes binding a freshly created item, before it is positioned.
    fn load_item(&self, _item: &mut Self::Item, _index: usize, _data: &T) {}
}

/// The on-screen representation of one item.
pub trait VisualItem {
    fn set_rect(&mut self, rect: Rect);
    fn set_is_selected(&mut self, is_selected: bool);
    fn set_text(&mut self, _text: &str) {}
}

/// The scroll container that hosts live visual items.
pub trait ScrollViewport<I> {
    /// The currently scrolled-into-view part of the content, in content coordinates.
    fn visible_content_rect(&self) -> Rect;

    /// Width given to every item rectangle.
    fn content_width(&self) -> f32;

    /// Reports the total content extent. Implementations must not synchronously call back into
    /// the engine.
    fn set_content_height(&mut self, height: f32);

    /// Asks the host control to resize itself to `height`. Only called when
    /// [`crate::ListOptions::auto_adjust_height`] is set.
    fn set_fixed_height(&mut self, _height: f32) {}

    fn add_child(&mut self, item: &I);
    fn remove_child(&mut self, item: &I);

    /// Starts deferring visual-tree change notifications. Calls nest.
    fn begin_update(&mut self) {}
    fn end_update(&mut self) {}
}

/// Non-owning handles to the data source and the delegate.
pub struct Binding<'a, S: ?Sized, D: ?Sized> {
    pub data_source: &'a S,
    pub delegate: &'a D,
}

impl<'a, S: ?Sized, D: ?Sized> Binding<'a, S, D> {
    pub fn new(data_source: &'a S, delegate: &'a D) -> Self {
        Self {
            data_source,
            delegate,
        }
    }
}

impl<S: ?Sized, D: ?Sized> Clone for Binding<'_, S, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized, D: ?Sized> Copy for Binding<'_, S, D> {}

/// Everything a [`crate::ListView`] call needs from the host.
pub struct Host<'a, S: ?Sized, D: ?Sized, V: ?Sized> {
    pub data_source: Option<&'a S>,
    pub delegate: Option<&'a D>,
    pub viewport: &'a mut V,
}

impl<'a, S: ?Sized, D: ?Sized, V: ?Sized> Host<'a, S, D, V> {
    pub fn new(data_source: &'a S, delegate: &'a D, viewport: &'a mut V) -> Self {
        Self {
            data_source: Some(data_source),
            delegate: Some(delegate),
            viewport,
        }
    }

    /// A host with no data source or delegate installed yet.
    pub fn unbound(viewport: &'a mut V) -> Self {
        Self {
            data_source: None,
            delegate: None,
            viewport,
        }
    }

    /// Returns the binding when both collaborators are installed.
    pub fn binding(&self) -> Option<Binding<'a, S, D>> {
        Some(Binding::new(self.data_source?, self.delegate?))
    }
}

/// Scoped `begin_update`/`end_update` bracket around a batch of child changes.
pub struct UpdateGuard<'a, I, V: ScrollViewport<I> + ?Sized> {
    viewport: &'a mut V,
    _item: core::marker::PhantomData<fn(&I)>,
}

impl<'a, I, V: ScrollViewport<I> + ?Sized> UpdateGuard<'a, I, V> {
    pub fn new(viewport: &'a mut V) -> Self {
        viewport.begin_update();
        Self {
            viewport,
            _item: core::marker::PhantomData,
        }
    }
}

impl<I, V: ScrollViewport<I> + ?Sized> Deref for UpdateGuard<'_, I, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.viewport
    }
}

impl<I, V: ScrollViewport<I> + ?Sized> DerefMut for UpdateGuard<'_, I, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.viewport
    }
}

impl<I, V: ScrollViewport<I> + ?Sized> Drop for UpdateGuard<'_, I, V> {
    fn drop(&mut self) {
        self.viewport.end_update();
    }
}
