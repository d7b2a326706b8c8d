use crate::hover::engine::ProbeResult;
use crate::overlay::placement::{place, Rect};
use crate::overlay::screen::screen_bounds_at;
use crate::overlay::sink::{DisplaySink, OverlayContent};
use crate::translate::{TranslationCoordinator, TranslationOutcome};
use std::sync::mpsc::Receiver;

/// Everything the consumer loop reacts to, in FIFO order per sender: hover
/// events from the sampling thread, outcomes from translation threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    Text(ProbeResult),
    ClearDisplay,
    Outcome(TranslationOutcome),
    Quit,
}

/// Owns the display sink and is the only place that mutates it.
///
/// The anchor is captured at probe time and reused for every subsequent
/// placement of the same display, so a finished translation reflows at the
/// probed spot rather than chasing the pointer.
pub struct Controller {
    events: Receiver<ControlEvent>,
    sink: Box<dyn DisplaySink>,
    coordinator: TranslationCoordinator,
    margin: i32,
    anchor: Option<(i32, i32)>,
    bounds_at: fn((i32, i32)) -> Rect,
}

impl Controller {
    pub fn new(
        events: Receiver<ControlEvent>,
        sink: Box<dyn DisplaySink>,
        coordinator: TranslationCoordinator,
        margin: i32,
    ) -> Self {
        Self {
            events,
            sink,
            coordinator,
            margin,
            anchor: None,
            bounds_at: screen_bounds_at,
        }
    }

    #[cfg(test)]
    fn with_bounds(mut self, bounds_at: fn((i32, i32)) -> Rect) -> Self {
        self.bounds_at = bounds_at;
        self
    }

    /// Consume events until the quit signal arrives or every sender is gone.
    pub fn run(&mut self) {
        while let Ok(event) = self.events.recv() {
            if !self.handle(event) {
                break;
            }
        }
        self.sink.shutdown();
    }

    fn handle(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Text(probe) => {
                tracing::info!(chars = probe.text.chars().count(), "hover text captured");
                self.anchor = Some(probe.anchor);
                self.sink.show(&OverlayContent::Translating {
                    original: probe.text.clone(),
                });
                self.reposition();
                self.coordinator.dispatch(probe.text);
            }
            ControlEvent::ClearDisplay => {
                self.sink.hide();
                self.anchor = None;
            }
            ControlEvent::Outcome(outcome) => {
                // The pointer already moved on; the outcome is obsolete.
                if self.anchor.is_none() {
                    return true;
                }
                let content = match outcome {
                    TranslationOutcome::Success {
                        original,
                        translated,
                    } => OverlayContent::Result {
                        original,
                        translated,
                    },
                    TranslationOutcome::Failure { original, reason } => {
                        tracing::warn!(%reason, "translation failed");
                        OverlayContent::Error { original, reason }
                    }
                };
                self.sink.show(&content);
                // Translated text rarely matches the placeholder's size.
                self.reposition();
            }
            ControlEvent::Quit => {
                tracing::info!("quit requested; shutting down");
                self.sink.hide();
                return false;
            }
        }
        true
    }

    fn reposition(&mut self) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let bounds = (self.bounds_at)(anchor);
        let pos = place(anchor, self.sink.size(), bounds, self.margin);
        self.sink.move_to(pos.0, pos.1);
    }
}
