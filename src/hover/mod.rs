pub mod engine;
pub mod filter;
pub mod sampler;
pub mod service;

pub use engine::{HoverEngine, HoverEvent, ProbeResult};
pub use sampler::{CursorProvider, DefaultCursorProvider, MotionSignal, MotionTracker};
pub use service::{HoverConfig, HoverService};
