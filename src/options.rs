use alloc::sync::Arc;

use crate::{SelectionChange, SelectionMode, SelectionStore};

/// Number of extra items kept alive above and below the viewport by default.
pub const DEFAULT_LOOKAHEAD: usize = 2;

/// A callback fired after every effective selection change, including changes caused by data
/// removal. It receives the store in its new state.
pub type SelectionChangeCallback = Arc<dyn Fn(&SelectionStore, SelectionChange) + Send + Sync>;

/// Configuration for [`crate::ListView`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
pub struct ListOptions {
    /// Items materialized beyond each edge of the viewport so fast scrolling does not flash
    /// blank rows.
    pub lookahead: usize,

    pub selection_mode: SelectionMode,

    /// When set, the host control is asked to resize itself to the content height
    /// (via [`crate::ScrollViewport::set_fixed_height`]).
    pub auto_adjust_height: bool,

    pub on_selection_change: Option<SelectionChangeCallback>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ListOptions {
    fn clone(&self) -> Self {
        Self {
            lookahead: self.lookahead,
            selection_mode: self.selection_mode,
            auto_adjust_height: self.auto_adjust_height,
            on_selection_change: self.on_selection_change.clone(),
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            selection_mode: SelectionMode::default(),
            auto_adjust_height: false,
            on_selection_change: None,
        }
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_selection_mode(mut self, selection_mode: SelectionMode) -> Self {
        self.selection_mode = selection_mode;
        self
    }

    pub fn with_auto_adjust_height(mut self, auto_adjust_height: bool) -> Self {
        self.auto_adjust_height = auto_adjust_height;
        self
    }

    pub fn with_on_selection_change(
        mut self,
        on_selection_change: Option<
            impl Fn(&SelectionStore, SelectionChange) + Send + Sync + 'static,
        >,
    ) -> Self {
        self.on_selection_change = on_selection_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for ListOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListOptions")
            .field("lookahead", &self.lookahead)
            .field("selection_mode", &self.selection_mode)
            .field("auto_adjust_height", &self.auto_adjust_height)
            .finish_non_exhaustive()
    }
}
