use std::time::{Duration, Instant};

/// Movement/rest signal derived from one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionSignal {
    /// The pointer travelled beyond the jitter threshold.
    Moved { position: (i32, i32) },
    /// The pointer stayed within the jitter threshold; `rested` is the time
    /// since the last genuine movement.
    Idle {
        position: (i32, i32),
        rested: Duration,
    },
}

/// Turns raw pointer samples into [`MotionSignal`]s.
///
/// The reference position only advances on genuine movement, so slow drift
/// within the jitter radius never resets the rest timer.
#[derive(Debug)]
pub struct MotionTracker {
    jitter_px: f32,
    last_position: (i32, i32),
    last_move: Instant,
}

impl MotionTracker {
    pub fn new(jitter_px: f32, origin: (i32, i32), now: Instant) -> Self {
        Self {
            jitter_px,
            last_position: origin,
            last_move: now,
        }
    }

    pub fn observe(&mut self, position: (i32, i32), now: Instant) -> MotionSignal {
        let dx = (position.0 - self.last_position.0) as f32;
        let dy = (position.1 - self.last_position.1) as f32;
        let dist_sq = dx * dx + dy * dy;

        if dist_sq > self.jitter_px * self.jitter_px {
            self.last_position = position;
            self.last_move = now;
            MotionSignal::Moved { position }
        } else {
            MotionSignal::Idle {
                position,
                rested: now.saturating_duration_since(self.last_move),
            }
        }
    }
}

pub trait CursorProvider: Send + Sync {
    fn position(&self) -> Option<(i32, i32)>;
}

#[derive(Debug, Default)]
pub struct DefaultCursorProvider;

impl CursorProvider for DefaultCursorProvider {
    #[cfg(windows)]
    fn position(&self) -> Option<(i32, i32)> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT { x: 0, y: 0 };
        if unsafe { GetCursorPos(&mut point).is_ok() } {
            Some((point.x, point.y))
        } else {
            None
        }
    }

    #[cfg(not(windows))]
    fn position(&self) -> Option<(i32, i32)> {
        None
    }
}
