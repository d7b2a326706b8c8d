use crate::controller::ControlEvent;
use crate::hover::engine::{HoverEngine, HoverEvent};
use crate::hover::filter::TextFilter;
use crate::hover::sampler::{CursorProvider, DefaultCursorProvider, MotionTracker};
use crate::keys::{DefaultKeyStateProvider, KeyCombo, KeyStateProvider};
use crate::probe::TextProbe;
use crate::settings::{ScriptGate, Settings};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Snapshot of the settings the sampling worker needs; read-only after
/// startup.
#[derive(Debug, Clone)]
pub struct HoverConfig {
    pub sample_interval: Duration,
    pub error_backoff: Duration,
    pub hover_threshold: Duration,
    pub jitter_px: f32,
    pub max_text_length: usize,
    pub script_gate: ScriptGate,
    pub denylist_extensions: Vec<String>,
    pub quit_combo: Option<KeyCombo>,
}

impl HoverConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sample_interval: settings.sample_interval(),
            error_backoff: settings.error_backoff(),
            hover_threshold: settings.hover_threshold(),
            jitter_px: settings.jitter_px,
            max_text_length: settings.max_text_length,
            script_gate: settings.script_gate.clone(),
            denylist_extensions: settings.denylist_extensions.clone(),
            quit_combo: settings.quit_combo(),
        }
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

/// Runs the sampling/hover loop on a dedicated thread and feeds the
/// controller channel. The worker is the single writer of the hover state;
/// stopping joins it within roughly one tick period.
pub struct HoverService {
    config: HoverConfig,
    probe: Arc<dyn TextProbe>,
    cursor: Arc<dyn CursorProvider>,
    keys: Arc<dyn KeyStateProvider>,
    worker: Option<WorkerHandle>,
}

impl HoverService {
    pub fn new(config: HoverConfig, probe: Arc<dyn TextProbe>) -> Self {
        Self::with_providers(
            config,
            probe,
            Arc::new(DefaultCursorProvider),
            Arc::new(DefaultKeyStateProvider),
        )
    }

    pub fn with_providers(
        config: HoverConfig,
        probe: Arc<dyn TextProbe>,
        cursor: Arc<dyn CursorProvider>,
        keys: Arc<dyn KeyStateProvider>,
    ) -> Self {
        Self {
            config,
            probe,
            cursor,
            keys,
            worker: None,
        }
    }

    pub fn start(&mut self, events: Sender<ControlEvent>) {
        if self.worker.is_some() {
            return;
        }
        let (stop_tx, stop_rx) = mpsc::channel();
        let config = self.config.clone();
        let probe = Arc::clone(&self.probe);
        let cursor = Arc::clone(&self.cursor);
        let keys = Arc::clone(&self.keys);
        let join = thread::spawn(move || worker_loop(config, probe, cursor, keys, events, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });
    }

    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

fn worker_loop(
    config: HoverConfig,
    probe: Arc<dyn TextProbe>,
    cursor: Arc<dyn CursorProvider>,
    keys: Arc<dyn KeyStateProvider>,
    events: Sender<ControlEvent>,
    stop_rx: Receiver<()>,
) {
    let filter = TextFilter::new(
        &config.script_gate,
        &config.denylist_extensions,
        config.max_text_length,
    );
    let mut engine = HoverEngine::new(config.hover_threshold, filter, probe);
    let mut tracker: Option<MotionTracker> = None;

    tracing::debug!(
        interval_ms = config.sample_interval.as_millis() as u64,
        "hover sampling loop started"
    );
    loop {
        // The stop-channel timeout doubles as the tick sleep.
        match stop_rx.recv_timeout(config.sample_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(combo) = &config.quit_combo {
            if keys.combo_pressed(combo) {
                let _ = events.send(ControlEvent::Quit);
                break;
            }
        }

        let Some(position) = cursor.position() else {
            // Transient query failures back off instead of spinning.
            tracing::debug!("pointer position unavailable; backing off");
            match stop_rx.recv_timeout(config.error_backoff) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        };

        let now = Instant::now();
        let tracker =
            tracker.get_or_insert_with(|| MotionTracker::new(config.jitter_px, position, now));
        let signal = tracker.observe(position, now);

        let event = match engine.observe(&signal) {
            Some(HoverEvent::Text(probe)) => ControlEvent::Text(probe),
            Some(HoverEvent::ClearDisplay) => ControlEvent::ClearDisplay,
            None => continue,
        };
        if events.send(event).is_err() {
            break;
        }
    }
    tracing::debug!("hover sampling loop stopped");
}
