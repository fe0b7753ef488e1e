/// An axis-aligned rectangle in content coordinates (y grows downwards).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Position and height of one item along the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemGeometry {
    /// Start y-coordinate of the item.
    pub position: f32,
    /// Height of the item (excludes spacing).
    pub height: f32,
}

impl ItemGeometry {
    pub fn end(&self) -> f32 {
        self.position + self.height
    }
}

impl From<(f32, f32)> for ItemGeometry {
    fn from((position, height): (f32, f32)) -> Self {
        Self { position, height }
    }
}

/// Where an item should land inside the viewport when scrolling to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    /// Keep the current offset if the item is fully visible, otherwise scroll the minimal
    /// distance.
    Auto,
}

/// How user-facing selection operations are interpreted by [`crate::ListView`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// Selection operations are ignored.
    None,
    /// At most one item is selected.
    #[default]
    Single,
    /// Each selection operation toggles independently.
    SimpleMultiple,
    /// Range selections are allowed in addition to single toggles.
    ExtendedMultiple,
}

impl SelectionMode {
    pub fn allows_multiple(&self) -> bool {
        matches!(self, Self::SimpleMultiple | Self::ExtendedMultiple)
    }
}
