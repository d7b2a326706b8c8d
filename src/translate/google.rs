use crate::translate::Translator;
use anyhow::{anyhow, bail, Context};
use std::time::Duration;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Translator backed by the public Google translate endpoint. The client
/// timeout bounds the whole call, so a dispatch thread can never outlive the
/// configured deadline by much.
pub struct GoogleTranslator {
    client: reqwest::blocking::Client,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(source: &str, target: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> anyhow::Result<String> {
        let url = format!(
            "{ENDPOINT}?client=gtx&dt=t&sl={}&tl={}&q={}",
            self.source,
            self.target,
            urlencoding::encode(text)
        );
        let body: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .context("translation request failed")?
            .error_for_status()
            .context("translation request rejected")?
            .json()
            .context("translation response was not json")?;
        parse_response(&body)
    }
}

/// The endpoint answers with nested arrays; the first element holds one
/// `[translated, original, ...]` row per source segment.
fn parse_response(body: &serde_json::Value) -> anyhow::Result<String> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("unexpected translation response shape"))?;

    let mut out = String::new();
    for segment in segments {
        if let Some(part) = segment.get(0).and_then(|v| v.as_str()) {
            out.push_str(part);
        }
    }
    if out.is_empty() {
        bail!("translation response contained no text");
    }
    Ok(out)
}
