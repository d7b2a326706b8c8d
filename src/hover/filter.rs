use crate::settings::ScriptGate;
use once_cell::sync::Lazy;
use regex::Regex;

static HAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fa5}]").unwrap());

/// Content filter applied to probed text before it is allowed downstream.
#[derive(Debug)]
pub struct TextFilter {
    gate: CompiledGate,
    denylist: Vec<String>,
    max_chars: usize,
}

#[derive(Debug)]
enum CompiledGate {
    Any,
    Han,
    Pattern(Regex),
}

impl CompiledGate {
    fn accepts(&self, text: &str) -> bool {
        match self {
            CompiledGate::Any => true,
            CompiledGate::Han => HAN_RE.is_match(text),
            CompiledGate::Pattern(re) => re.is_match(text),
        }
    }
}

impl TextFilter {
    pub fn new(gate: &ScriptGate, denylist: &[String], max_chars: usize) -> Self {
        let gate = match gate {
            ScriptGate::Any => CompiledGate::Any,
            ScriptGate::Han => CompiledGate::Han,
            ScriptGate::Pattern { pattern } => match Regex::new(pattern) {
                Ok(re) => CompiledGate::Pattern(re),
                Err(err) => {
                    tracing::warn!(%pattern, %err, "invalid script gate pattern; using han gate");
                    CompiledGate::Han
                }
            },
        };
        Self {
            gate,
            denylist: denylist.iter().map(|s| s.to_lowercase()).collect(),
            max_chars,
        }
    }

    /// Returns the cleaned text, or `None` when it should be suppressed.
    pub fn apply(&self, raw: &str) -> Option<String> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        if !self.gate.accepts(text) {
            return None;
        }
        let lower = text.to_lowercase();
        if self.denylist.iter().any(|entry| lower.contains(entry)) {
            return None;
        }
        Some(truncate_chars(text, self.max_chars))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn han_filter() -> TextFilter {
        TextFilter::new(
            &ScriptGate::Han,
            &[".txt".into(), ".exe".into(), ".dll".into()],
            1000,
        )
    }

    #[test]
    fn han_gate_rejects_latin_only_text() {
        assert_eq!(han_filter().apply("Hello"), None);
    }

    #[test]
    fn han_gate_accepts_cjk_text() {
        assert_eq!(han_filter().apply("你好"), Some("你好".to_string()));
    }

    #[test]
    fn mixed_text_passes_the_gate() {
        assert_eq!(
            han_filter().apply("点击 OK 继续"),
            Some("点击 OK 继续".to_string())
        );
    }

    #[test]
    fn empty_and_whitespace_are_suppressed() {
        assert_eq!(han_filter().apply(""), None);
        assert_eq!(han_filter().apply("   \n"), None);
    }

    #[test]
    fn denylist_matches_case_insensitively() {
        assert_eq!(han_filter().apply("报告.TXT"), None);
        assert_eq!(han_filter().apply("安装程序.exe"), None);
    }

    #[test]
    fn overlong_text_is_truncated_to_exactly_max_chars() {
        let long: String = "试".repeat(1200);
        let out = han_filter().apply(&long).expect("accepted");
        assert_eq!(out.chars().count(), 1000);
    }

    #[test]
    fn any_gate_accepts_latin_text() {
        let filter = TextFilter::new(&ScriptGate::Any, &[], 1000);
        assert_eq!(filter.apply("Hello"), Some("Hello".to_string()));
    }

    #[test]
    fn pattern_gate_uses_the_regex() {
        let filter = TextFilter::new(
            &ScriptGate::Pattern {
                pattern: "[\u{3040}-\u{30ff}]".into(),
            },
            &[],
            1000,
        );
        assert_eq!(filter.apply("ひらがな"), Some("ひらがな".to_string()));
        assert_eq!(filter.apply("Hello"), None);
    }

    #[test]
    fn invalid_pattern_falls_back_to_han() {
        let filter = TextFilter::new(
            &ScriptGate::Pattern {
                pattern: "[".into(),
            },
            &[],
            1000,
        );
        assert_eq!(filter.apply("你好"), Some("你好".to_string()));
        assert_eq!(filter.apply("Hello"), None);
    }
}
