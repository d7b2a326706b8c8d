pub mod placement;
pub mod screen;
pub mod sink;

pub use placement::{place, Rect, Size};
pub use screen::screen_bounds_at;
pub use sink::{default_sink, DisplaySink, NoopDisplaySink, OverlayContent};
