//! One daily run: headlines → selection → prayer → speech markup → record.
//!
//! Stages run strictly in sequence. Nothing is written to the prayer slot
//! until every stage has succeeded.

use crate::cache::SourceCache;
use crate::composer::NarrativeComposer;
use crate::config::Config;
use crate::error::Result;
use crate::markup::MarkupEnhancer;
use crate::prompts;
use crate::record::{PrayerRecord, SpeechMarkupDocument, TimeOfDay};
use crate::selector::HeadlineSelector;
use crate::store::Store;
use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;
use vigil_clients::{ChatModel, NewsSource};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Local wall-clock time of the run. Picks the cache day and the slot.
    pub now: NaiveDateTime,
    /// Run every stage but leave the prayer slot untouched.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub record: PrayerRecord,
    /// Side artifact for the audio renderer. Not part of the record.
    pub markup: SpeechMarkupDocument,
    pub persisted: bool,
}

pub struct PipelineRunner<'a> {
    store: &'a dyn Store,
    news: &'a dyn NewsSource,
    model: &'a dyn ChatModel,
    config: &'a Config,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        store: &'a dyn Store,
        news: &'a dyn NewsSource,
        model: &'a dyn ChatModel,
        config: &'a Config,
    ) -> Self {
        Self {
            store,
            news,
            model,
            config,
        }
    }

    pub async fn run(&self, opts: &RunOptions) -> Result<RunOutput> {
        let day = opts.now.date();
        let time_of_day = TimeOfDay::from_hour(opts.now.hour());
        info!(%day, %time_of_day, dry_run = opts.dry_run, "pipeline started");

        let stages = &self.config.stages;
        let policy = self
            .config
            .selection
            .policy
            .as_deref()
            .unwrap_or(prompts::DEFAULT_SELECTION_POLICY);

        let cache = SourceCache::new(self.store, self.news, day);
        let headlines = HeadlineSelector::new(self.model, &stages.select, policy)
            .gather_and_select(&cache, &self.config.news, day)
            .await?;

        let text = NarrativeComposer::new(self.model, &stages.compose)
            .compose(&headlines, time_of_day)
            .await?;

        // The enhanced markup is handed back to the caller and never folded
        // into the record: prayer_text stays unmarked.
        let markup = MarkupEnhancer::new(self.model, &stages.enhance, self.config.markup.pacing)
            .render(&text)
            .await?;

        let record = PrayerRecord {
            time_of_day,
            headlines_used: headlines,
            prayer_text: collapse_line_breaks(&text),
        };

        if !opts.dry_run {
            record.save(self.store)?;
            info!(%time_of_day, headlines = record.headlines_used.len(), "prayer record saved");
        }

        Ok(RunOutput {
            record,
            markup,
            persisted: !opts.dry_run,
        })
    }
}

static LINE_BREAKS_RE: OnceLock<Regex> = OnceLock::new();

/// Replace each run of `\r`/`\n` with a single space.
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS_RE
        .get_or_init(|| Regex::new(r"[\r\n]+").unwrap())
        .replace_all(text, " ")
        .into_owned()
}
