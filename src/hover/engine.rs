use crate::hover::filter::TextFilter;
use crate::hover::sampler::MotionSignal;
use crate::probe::TextProbe;
use std::sync::Arc;
use std::time::Duration;

/// Text accepted for translation, together with the pointer position the
/// probe fired at. The anchor stays fixed for the lifetime of the display
/// even if the pointer later drifts within the jitter radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub text: String,
    pub anchor: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverEvent {
    Text(ProbeResult),
    ClearDisplay,
}

/// Hover state machine: Moving, Resting-Unprobed, Resting-Probed.
///
/// The expensive extraction call fires exactly once per rest period; even a
/// failed or filtered probe arms `triggered` so a textless region does not
/// get re-probed every tick until the pointer moves again.
pub struct HoverEngine {
    hover_threshold: Duration,
    probe: Arc<dyn TextProbe>,
    filter: TextFilter,
    triggered: bool,
    displayed: bool,
    last_text: Option<String>,
}

impl HoverEngine {
    pub fn new(hover_threshold: Duration, filter: TextFilter, probe: Arc<dyn TextProbe>) -> Self {
        Self {
            hover_threshold,
            probe,
            filter,
            triggered: false,
            displayed: false,
            last_text: None,
        }
    }

    pub fn observe(&mut self, signal: &MotionSignal) -> Option<HoverEvent> {
        match *signal {
            MotionSignal::Moved { .. } => {
                let had_display = self.displayed;
                self.triggered = false;
                self.displayed = false;
                self.last_text = None;
                // The overlay disappears the instant the pointer leaves a
                // probed target, independent of translation completion.
                had_display.then_some(HoverEvent::ClearDisplay)
            }
            MotionSignal::Idle { position, rested } => {
                if self.triggered || rested < self.hover_threshold {
                    return None;
                }
                self.triggered = true;

                let raw = self.probe.text_at(position.0, position.1)?;
                let text = self.filter.apply(&raw)?;
                if self.last_text.as_deref() == Some(text.as_str()) {
                    return None;
                }
                tracing::debug!(chars = text.chars().count(), "hover probe accepted text");
                self.last_text = Some(text.clone());
                self.displayed = true;
                Some(HoverEvent::Text(ProbeResult {
                    text,
                    anchor: position,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ScriptGate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedProbe {
        calls: AtomicUsize,
        responses: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedProbe {
        fn returning(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(vec![Some(text.to_string())]),
            })
        }

        fn sequence(responses: Vec<Option<String>>) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(responses),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextProbe for ScriptedProbe {
        fn text_at(&self, _x: i32, _y: i32) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            match responses.len() {
                0 => None,
                1 => responses[0].clone(),
                _ => responses.pop().unwrap(),
            }
        }
    }

    fn engine(probe: Arc<ScriptedProbe>) -> HoverEngine {
        HoverEngine::new(
            Duration::from_millis(500),
            TextFilter::new(&ScriptGate::Han, &[], 1000),
            probe,
        )
    }

    fn idle(position: (i32, i32), ms: u64) -> MotionSignal {
        MotionSignal::Idle {
            position,
            rested: Duration::from_millis(ms),
        }
    }

    fn moved(position: (i32, i32)) -> MotionSignal {
        MotionSignal::Moved { position }
    }

    #[test]
    fn probe_fires_exactly_once_per_rest_period() {
        let probe = ScriptedProbe::returning("测试");
        let mut engine = engine(probe.clone());

        let event = engine.observe(&idle((10, 10), 500));
        assert_eq!(
            event,
            Some(HoverEvent::Text(ProbeResult {
                text: "测试".into(),
                anchor: (10, 10)
            }))
        );

        for ms in [550, 600, 650, 700, 750] {
            assert_eq!(engine.observe(&idle((10, 10), ms)), None);
        }
        assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn short_rest_does_not_probe() {
        let probe = ScriptedProbe::returning("测试");
        let mut engine = engine(probe.clone());

        assert_eq!(engine.observe(&idle((10, 10), 499)), None);
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn movement_rearms_the_probe() {
        let probe = ScriptedProbe::sequence(vec![
            Some("测试".into()),
            Some("其他".into()),
        ]);
        let mut engine = engine(probe.clone());

        assert!(engine.observe(&idle((10, 10), 500)).is_some());
        assert_eq!(engine.observe(&moved((80, 80))), Some(HoverEvent::ClearDisplay));

        let event = engine.observe(&idle((80, 80), 500));
        assert_eq!(
            event,
            Some(HoverEvent::Text(ProbeResult {
                text: "其他".into(),
                anchor: (80, 80)
            }))
        );
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn empty_probe_still_arms_and_emits_no_clear_on_movement() {
        let probe = ScriptedProbe::sequence(vec![None]);
        let mut engine = engine(probe.clone());

        assert_eq!(engine.observe(&idle((10, 10), 500)), None);
        assert_eq!(engine.observe(&idle((10, 10), 600)), None);
        assert_eq!(probe.calls(), 1);

        // Nothing was displayed, so movement has nothing to clear.
        assert_eq!(engine.observe(&moved((80, 80))), None);
    }

    #[test]
    fn filtered_probe_counts_as_empty() {
        let probe = ScriptedProbe::returning("Hello");
        let mut engine = engine(probe.clone());

        assert_eq!(engine.observe(&idle((10, 10), 500)), None);
        assert_eq!(engine.observe(&idle((10, 10), 600)), None);
        assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn repeated_text_is_suppressed() {
        let probe = ScriptedProbe::returning("测试");
        let mut engine = engine(probe.clone());

        assert!(engine.observe(&idle((10, 10), 500)).is_some());

        // Force a second probe within the same display lineage.
        engine.triggered = false;
        assert_eq!(engine.observe(&idle((10, 10), 600)), None);
        assert_eq!(probe.calls(), 2);
    }
}
