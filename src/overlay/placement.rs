#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

/// Compute the overlay's top-left corner for a given anchor.
///
/// The preferred spot is to the lower-right of the anchor so the cursor
/// stays unobstructed; overflowing edges flip the overlay to the opposite
/// side of the anchor, and a final clamp keeps the top-left corner inside
/// the screen. For content smaller than the screen the result is always
/// fully contained.
pub fn place(anchor: (i32, i32), content: Size, bounds: Rect, margin: i32) -> (i32, i32) {
    let mut x = anchor.0 + margin;
    let mut y = anchor.1 + margin;

    if x + content.w > bounds.right {
        x = anchor.0 - content.w - margin;
    }
    if y + content.h > bounds.bottom {
        y = anchor.1 - content.h - margin;
    }

    (x.max(bounds.left), y.max(bounds.top))
}
