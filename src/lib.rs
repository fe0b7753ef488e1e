//! A headless list virtualization engine.
//!
//! This crate backs scrollable list controls whose item collection may be huge. It decides which
//! items need a live visual object for the current viewport, tracks fixed- or variable-height
//! item geometry, and patches the window of live items incrementally as the data source reports
//! insertions, removals, updates and moves.
//!
//! It is UI-agnostic. A host UI layer is expected to provide, through the traits in this crate:
//! - a [`DataSource`] (item count and per-item data)
//! - an [`ItemDelegate`] (height estimates, spacing, visual-item creation)
//! - a [`ScrollViewport`] (visible rectangle, child add/remove, content height)
//!
//! [`ListView`] ties the pieces together; [`ItemHeightManager`], [`SelectionStore`] and
//! [`VisibleItemManager`] are usable on their own.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod height;
mod host;
mod list;
mod options;
mod range;
mod selection;
mod types;
mod visible;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use height::ItemHeightManager;
pub use host::{
    Binding, DataSource, Host, ItemDelegate, ScrollViewport, UpdateGuard, VisualItem,
};
pub use list::{DataChange, ListView};
pub use options::{DEFAULT_LOOKAHEAD, ListOptions, SelectionChangeCallback};
pub use range::{ItemRange, RangeDifference, calculate_range_difference};
pub use selection::{SelectionChange, SelectionChangeReason, SelectionStore};
pub use types::{Align, ItemGeometry, Rect, SelectionMode};
pub use visible::{LayoutContext, VisibleItemManager};
