use crate::keys::{parse_combo, KeyCombo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default settings file, read from the working directory. The tool is
/// deliberately stateless otherwise: no cache files, no user-dir writes.
pub const SETTINGS_FILE: &str = "hover_translator.json";

/// Which scripts the hover text must contain before it is worth translating.
///
/// The reference behavior reacts only to text containing Han characters while
/// translating toward a fixed target tag. That combination is preserved as
/// the default rather than "corrected"; both sides are tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptGate {
    /// Accept any non-empty text.
    Any,
    /// Require at least one character in U+4E00..=U+9FA5.
    Han,
    /// Require a match of the given regex.
    Pattern { pattern: String },
}

impl Default for ScriptGate {
    fn default() -> Self {
        ScriptGate::Han
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Pointer sampling period in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Delay before the next tick after a failed pointer query.
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    /// How long the pointer must rest before a probe fires.
    #[serde(default = "default_hover_threshold_secs")]
    pub hover_threshold_secs: f32,
    /// Displacement below this many pixels counts as sensor noise.
    #[serde(default = "default_jitter_px")]
    pub jitter_px: f32,
    /// Probed text is truncated to this many characters.
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// Gap between the anchor point and the overlay.
    #[serde(default = "default_overlay_margin_px")]
    pub overlay_margin_px: i32,
    #[serde(default = "default_translation_timeout_secs")]
    pub translation_timeout_secs: f32,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default)]
    pub script_gate: ScriptGate,
    /// Substrings that mark probed text as OS-chrome noise (file names and
    /// the like); matched case-insensitively.
    #[serde(default = "default_denylist_extensions")]
    pub denylist_extensions: Vec<String>,
    /// Key combination that shuts the whole pipeline down.
    #[serde(default = "default_quit_hotkey")]
    pub quit_hotkey: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_sample_interval_ms() -> u64 {
    50
}

fn default_error_backoff_ms() -> u64 {
    1000
}

fn default_hover_threshold_secs() -> f32 {
    0.5
}

fn default_jitter_px() -> f32 {
    3.0
}

fn default_max_text_length() -> usize {
    1000
}

fn default_overlay_margin_px() -> i32 {
    16
}

fn default_translation_timeout_secs() -> f32 {
    5.0
}

fn default_source_lang() -> String {
    "auto".into()
}

fn default_target_lang() -> String {
    "en".into()
}

fn default_denylist_extensions() -> Vec<String> {
    [".txt", ".exe", ".dll", ".py", ".js"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_quit_hotkey() -> Option<String> {
    Some("Ctrl+Q".into())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            hover_threshold_secs: default_hover_threshold_secs(),
            jitter_px: default_jitter_px(),
            max_text_length: default_max_text_length(),
            overlay_margin_px: default_overlay_margin_px(),
            translation_timeout_secs: default_translation_timeout_secs(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            script_gate: ScriptGate::default(),
            denylist_extensions: default_denylist_extensions(),
            quit_hotkey: default_quit_hotkey(),
            debug_logging: false,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms.max(1))
    }

    pub fn hover_threshold(&self) -> Duration {
        Duration::from_secs_f32(self.hover_threshold_secs.max(0.0))
    }

    pub fn translation_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.translation_timeout_secs.max(0.1))
    }

    /// Parse the quit combination if configured.
    pub fn quit_combo(&self) -> Option<KeyCombo> {
        if let Some(hotkey) = &self.quit_hotkey {
            match parse_combo(hotkey) {
                Some(combo) => return Some(combo),
                None => {
                    tracing::warn!(
                        "provided quit_hotkey string '{}' is invalid; ignoring",
                        hotkey
                    );
                }
            }
        }
        None
    }
}
