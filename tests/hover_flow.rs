use hover_translator::controller::{ControlEvent, Controller};
use hover_translator::hover::{CursorProvider, HoverConfig, HoverService};
use hover_translator::keys::{parse_combo, KeyCombo, KeyStateProvider};
use hover_translator::overlay::placement::Size;
use hover_translator::overlay::sink::{estimate_text_size, DisplaySink, OverlayContent};
use hover_translator::probe::TextProbe;
use hover_translator::settings::ScriptGate;
use hover_translator::translate::{TranslationCoordinator, Translator};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum SinkCall {
    Show(String),
    MoveTo(i32, i32),
    Hide,
}

#[derive(Clone)]
struct RecordingSink {
    calls: Arc<Mutex<Vec<SinkCall>>>,
    size: Arc<Mutex<Size>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            size: Arc::new(Mutex::new(Size { w: 0, h: 0 })),
        }
    }

    fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    fn wait_for<F>(&self, what: &str, predicate: F) -> Vec<SinkCall>
    where
        F: Fn(&[SinkCall]) -> bool,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let calls = self.calls();
            if predicate(&calls) {
                return calls;
            }
            if Instant::now() > deadline {
                panic!("timed out waiting for {what}; saw {calls:?}");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, content: &OverlayContent) {
        let text = content.display_text();
        *self.size.lock().unwrap() = estimate_text_size(&text);
        self.calls.lock().unwrap().push(SinkCall::Show(text));
    }

    fn size(&self) -> Size {
        *self.size.lock().unwrap()
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.calls.lock().unwrap().push(SinkCall::MoveTo(x, y));
    }

    fn hide(&mut self) {
        self.calls.lock().unwrap().push(SinkCall::Hide);
    }
}

struct SharedCursor {
    position: Mutex<(i32, i32)>,
}

impl SharedCursor {
    fn new(position: (i32, i32)) -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(position),
        })
    }

    fn set(&self, position: (i32, i32)) {
        *self.position.lock().unwrap() = position;
    }
}

impl CursorProvider for SharedCursor {
    fn position(&self) -> Option<(i32, i32)> {
        Some(*self.position.lock().unwrap())
    }
}

/// Yields text on the first probe only, so a later rest period at the new
/// position does not re-trigger a display mid-assertion.
struct OneShotProbe {
    calls: AtomicUsize,
}

impl TextProbe for OneShotProbe {
    fn text_at(&self, _x: i32, _y: i32) -> Option<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Some("测试".to_string())
        } else {
            None
        }
    }
}

struct FlagKeys {
    quit: AtomicBool,
}

impl KeyStateProvider for FlagKeys {
    fn combo_pressed(&self, _combo: &KeyCombo) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

struct FastTranslator;

impl Translator for FastTranslator {
    fn translate(&self, _text: &str) -> anyhow::Result<String> {
        Ok("test".to_string())
    }
}

fn test_config() -> HoverConfig {
    HoverConfig {
        sample_interval: Duration::from_millis(10),
        error_backoff: Duration::from_millis(50),
        hover_threshold: Duration::from_millis(50),
        jitter_px: 3.0,
        max_text_length: 1000,
        script_gate: ScriptGate::Han,
        denylist_extensions: vec![".txt".into(), ".exe".into()],
        quit_combo: parse_combo("Ctrl+Q"),
    }
}

#[test]
fn rest_probe_translate_and_clear_on_movement() {
    let (events_tx, events_rx) = mpsc::channel::<ControlEvent>();

    let cursor = SharedCursor::new((100, 100));
    let probe = Arc::new(OneShotProbe {
        calls: AtomicUsize::new(0),
    });
    let keys = Arc::new(FlagKeys {
        quit: AtomicBool::new(false),
    });

    let mut service = HoverService::with_providers(
        test_config(),
        probe.clone(),
        cursor.clone(),
        keys.clone(),
    );
    service.start(events_tx.clone());

    let sink = RecordingSink::new();
    let coordinator = TranslationCoordinator::new(Arc::new(FastTranslator), events_tx);
    let controller_sink = sink.clone();
    let controller = thread::spawn(move || {
        let mut controller = Controller::new(events_rx, Box::new(controller_sink), coordinator, 16);
        controller.run();
    });

    // Resting at (100, 100) long enough probes once and shows the
    // placeholder, then the translation replaces it.
    sink.wait_for("translating placeholder", |calls| {
        calls.contains(&SinkCall::Show("测试\n\n[translating...]".into()))
    });
    sink.wait_for("translated result", |calls| {
        calls.contains(&SinkCall::Show("测试\n\ntest".into()))
    });

    // Leaving the probed target hides the overlay immediately.
    cursor.set((300, 300));
    sink.wait_for("hide after movement", |calls| {
        calls.contains(&SinkCall::Hide)
    });

    // The quit combo tears the whole pipeline down.
    keys.quit.store(true, Ordering::SeqCst);
    controller.join().expect("controller thread");
    service.stop();
    assert!(!service.is_running());

    let calls = sink.calls();
    let placeholder = calls
        .iter()
        .position(|c| *c == SinkCall::Show("测试\n\n[translating...]".into()))
        .expect("placeholder shown");
    let result = calls
        .iter()
        .position(|c| *c == SinkCall::Show("测试\n\ntest".into()))
        .expect("result shown");
    let hide = calls
        .iter()
        .position(|c| *c == SinkCall::Hide)
        .expect("hidden");
    assert!(placeholder < result, "placeholder precedes result: {calls:?}");
    assert!(result < hide, "result precedes hide: {calls:?}");
    assert!(
        matches!(calls[placeholder + 1], SinkCall::MoveTo(_, _)),
        "placement follows the placeholder: {calls:?}"
    );

    // Only the first rest period probed; the display itself came from a
    // single extraction call even though idle ticks kept arriving.
    let placeholder_count = calls
        .iter()
        .filter(|c| matches!(c, SinkCall::Show(text) if text.ends_with("[translating...]")))
        .count();
    assert_eq!(placeholder_count, 1);
}
