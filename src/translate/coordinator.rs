use crate::controller::ControlEvent;
use crate::translate::{TranslationOutcome, Translator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

/// Dispatches translations off the sampling path and drops results that a
/// newer hover target has superseded.
///
/// `current_id` holds the highest id issued so far; a completing call is
/// delivered only while its own id still matches. Superseded calls run to
/// completion and are discarded — no cancellation plumbing.
pub struct TranslationCoordinator {
    translator: Arc<dyn Translator>,
    events: Sender<ControlEvent>,
    current_id: Arc<AtomicU64>,
}

impl TranslationCoordinator {
    pub fn new(translator: Arc<dyn Translator>, events: Sender<ControlEvent>) -> Self {
        Self {
            translator,
            events,
            current_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dispatch(&self, text: String) {
        let id = self.current_id.fetch_add(1, Ordering::AcqRel) + 1;
        let translator = Arc::clone(&self.translator);
        let current_id = Arc::clone(&self.current_id);
        let events = self.events.clone();

        tracing::debug!(id, chars = text.chars().count(), "dispatching translation");
        thread::spawn(move || {
            let outcome = match translator.translate(&text) {
                Ok(translated) if !translated.trim().is_empty() => TranslationOutcome::Success {
                    original: text,
                    translated,
                },
                Ok(_) => TranslationOutcome::Failure {
                    original: text,
                    reason: "empty result".into(),
                },
                Err(err) => TranslationOutcome::Failure {
                    original: text,
                    reason: err.to_string(),
                },
            };

            if current_id.load(Ordering::Acquire) != id {
                tracing::debug!(id, "discarding stale translation result");
                return;
            }
            let _ = events.send(ControlEvent::Outcome(outcome));
        });
    }

    pub fn current_id(&self) -> u64 {
        self.current_id.load(Ordering::Acquire)
    }
}
