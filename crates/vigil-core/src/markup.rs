//! Speech markup for the downstream audio renderer.
//!
//! `wrap` is local and deterministic. `enhance` asks the model to annotate
//! pronunciation and, in [`PacingMode::Model`], to randomize the pauses too.
//! The enhanced document is returned to the caller only; the daily record
//! keeps the unmarked text.

use crate::config::PacingMode;
use crate::error::{Result, VigilError};
use crate::prompts;
use crate::record::SpeechMarkupDocument;
use rand::Rng;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use vigil_clients::{ChatModel, ChatParams, ChatRequest};

pub const SHORT_PAUSE_MS: u32 = 200;
pub const LONG_PAUSE_MS: u32 = 900;
pub const ENVELOPE_PAUSE_MS: u32 = 500;

pub const SHORT_PAUSE_RANGE: RangeInclusive<u32> = 100..=250;
pub const LONG_PAUSE_RANGE: RangeInclusive<u32> = 700..=1100;

const PROSODY_OPEN: &str = r#"<prosody rate="85%" pitch="-5st">"#;

static BREAK_RE: OnceLock<Regex> = OnceLock::new();

fn break_re() -> &'static Regex {
    BREAK_RE.get_or_init(|| Regex::new(r#"<break time="(\d+)ms"\s*/>"#).unwrap())
}

fn pause(ms: u32) -> String {
    format!(r#"<break time="{ms}ms"/>"#)
}

// ---------------------------------------------------------------------------
// Local transforms
// ---------------------------------------------------------------------------

/// Wrap plain text in the speech envelope. Every `.` becomes a long pause
/// and every `,` a short pause.
pub fn wrap(text: &str) -> String {
    let body = escape(text)
        .replace('.', &pause(LONG_PAUSE_MS))
        .replace(',', &pause(SHORT_PAUSE_MS));
    let edge = pause(ENVELOPE_PAUSE_MS);
    format!(
        "<speak>\n    {PROSODY_OPEN}\n        {edge}\n        {body}\n        {edge}\n    </prosody>\n</speak>"
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Re-draw every nominal short and long pause uniformly within its range.
/// Envelope pauses are left alone.
pub fn randomize_pauses<R: Rng>(markup: &str, rng: &mut R) -> String {
    break_re()
        .replace_all(markup, |caps: &regex::Captures<'_>| {
            match caps[1].parse::<u32>() {
                Ok(SHORT_PAUSE_MS) => pause(rng.gen_range(SHORT_PAUSE_RANGE)),
                Ok(LONG_PAUSE_MS) => pause(rng.gen_range(LONG_PAUSE_RANGE)),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Every pause duration in document order, envelope pauses included.
pub fn pause_durations(markup: &str) -> Vec<u32> {
    break_re()
        .captures_iter(markup)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// MarkupEnhancer
// ---------------------------------------------------------------------------

pub struct MarkupEnhancer<'a> {
    model: &'a dyn ChatModel,
    params: &'a ChatParams,
    pacing: PacingMode,
}

impl<'a> MarkupEnhancer<'a> {
    pub fn new(model: &'a dyn ChatModel, params: &'a ChatParams, pacing: PacingMode) -> Self {
        Self {
            model,
            params,
            pacing,
        }
    }

    pub async fn enhance(&self, raw: &str) -> Result<String> {
        let prompt = match self.pacing {
            PacingMode::Model => prompts::enhance_prompt(raw),
            PacingMode::Local => {
                let paced = randomize_pauses(raw, &mut rand::thread_rng());
                prompts::pronunciation_prompt(&paced)
            }
        };
        let request = ChatRequest::new(self.params, prompts::ENHANCE_SYSTEM, prompt);
        let enhanced = self
            .model
            .complete(&request)
            .await
            .map_err(VigilError::model)?;

        let durations = pause_durations(&enhanced);
        debug!(pacing = ?self.pacing, pauses = ?durations, "markup enhanced");
        if self.pacing == PacingMode::Local && durations.len() != pause_durations(raw).len() {
            warn!(
                expected = pause_durations(raw).len(),
                got = durations.len(),
                "pronunciation pass changed the number of pauses"
            );
        }
        Ok(enhanced)
    }

    /// Wrap then enhance.
    pub async fn render(&self, text: &str) -> Result<SpeechMarkupDocument> {
        let raw = wrap(text);
        let enhanced = self.enhance(&raw).await?;
        info!(raw_len = raw.len(), enhanced_len = enhanced.len(), "speech markup ready");
        Ok(SpeechMarkupDocument { raw, enhanced })
    }
}
