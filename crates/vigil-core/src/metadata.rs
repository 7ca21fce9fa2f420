//! Publish metadata (title and description) for the current prayer.
//!
//! Each time-of-day slot is its own series. A run reads the previous record
//! for its slot as continuity context before overwriting it.

use crate::config::{MetadataConfig, ParseMode};
use crate::error::{Result, VigilError};
use crate::prompts;
use crate::record::{MetadataRecord, PrayerRecord};
use crate::store::Store;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};
use vigil_clients::{ChatModel, ChatParams, ChatRequest};

pub struct MetadataGenerator<'a> {
    store: &'a dyn Store,
    model: &'a dyn ChatModel,
    params: &'a ChatParams,
    config: &'a MetadataConfig,
}

impl<'a> MetadataGenerator<'a> {
    pub fn new(
        store: &'a dyn Store,
        model: &'a dyn ChatModel,
        params: &'a ChatParams,
        config: &'a MetadataConfig,
    ) -> Self {
        Self {
            store,
            model,
            params,
            config,
        }
    }

    /// Build the next record for the prayer's slot. With `dry_run` the slot
    /// is left as it was.
    pub async fn generate(&self, dry_run: bool) -> Result<MetadataRecord> {
        let prayer = PrayerRecord::load_required(self.store)?;
        let slot = prayer.time_of_day;
        let previous = MetadataRecord::load(self.store, slot)?;
        debug!(%slot, has_previous = previous.is_some(), "metadata context loaded");

        let context = match &previous {
            Some(record) => serde_json::to_string_pretty(record)?,
            None => String::new(),
        };
        let prompt = prompts::metadata_prompt(
            &prayer.headlines_used,
            slot,
            self.config.series.for_slot(slot),
            &context,
        );
        let request = ChatRequest::new(self.params, prompts::METADATA_SYSTEM, prompt);
        let reply = self
            .model
            .complete(&request)
            .await
            .map_err(VigilError::model)?;

        let (title, description) = parse_title_description(&reply, self.config.parse_mode)?;
        let record = MetadataRecord {
            title,
            description,
            time_of_day: slot,
            headlines_used: prayer.headlines_used,
            prayer_text: prayer.prayer_text,
        };

        if !dry_run {
            record.save(self.store)?;
            info!(%slot, title = %record.title, "metadata record saved");
        }
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

static TITLE_LABEL_RE: OnceLock<Regex> = OnceLock::new();
static DESCRIPTION_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn title_label() -> &'static Regex {
    TITLE_LABEL_RE.get_or_init(|| Regex::new(r"(?i)^[#*_\s]*title[*_\s]*:[*_\s]*").unwrap())
}

fn description_label() -> &'static Regex {
    DESCRIPTION_LABEL_RE
        .get_or_init(|| Regex::new(r"(?i)^[#*_\s]*description[*_\s]*:[*_\s]*").unwrap())
}

/// Split a reply into (title, description) at its first line break.
///
/// A reply with no line break is malformed in both modes.
pub fn parse_title_description(reply: &str, mode: ParseMode) -> Result<(String, String)> {
    let reply = reply.trim();
    let Some((head, tail)) = reply.split_once('\n') else {
        return Err(VigilError::MalformedResponse(format!(
            "expected a title line and a description, got a single line: {reply:?}"
        )));
    };

    match mode {
        ParseMode::Legacy => Ok((
            head.replace("Title:", "").trim().to_string(),
            tail.replace("Description:", "").trim().to_string(),
        )),
        ParseMode::Strict => {
            let title = title_label().replace(head.trim(), "").trim().to_string();
            let description = description_label()
                .replace(tail.trim(), "")
                .trim()
                .to_string();
            if title.is_empty() {
                return Err(VigilError::MalformedResponse("empty title".to_string()));
            }
            if description.is_empty() {
                return Err(VigilError::MalformedResponse("empty description".to_string()));
            }
            Ok((title, description))
        }
    }
}
