use crate::overlay::placement::Rect;
use screenshots::Screen;

/// Bounds used when no monitor can be resolved at all (headless test runs,
/// display reconfiguration races).
pub const FALLBACK_BOUNDS: Rect = Rect {
    left: 0,
    top: 0,
    right: 1920,
    bottom: 1080,
};

/// Geometry of the monitor containing `point`, falling back to the primary
/// screen and finally to [`FALLBACK_BOUNDS`].
pub fn screen_bounds_at(point: (i32, i32)) -> Rect {
    match Screen::from_point(point.0, point.1).or_else(|_| Screen::from_point(0, 0)) {
        Ok(screen) => {
            let info = screen.display_info;
            Rect {
                left: info.x,
                top: info.y,
                right: info.x + info.width as i32,
                bottom: info.y + info.height as i32,
            }
        }
        Err(err) => {
            tracing::debug!(?err, "screen lookup failed; using fallback bounds");
            FALLBACK_BOUNDS
        }
    }
}
