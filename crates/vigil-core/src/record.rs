use crate::error::{Result, VigilError};
use crate::paths;
use crate::store::{load_json, save_json, Store};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    /// Local hours 5 through 11 are morning; everything else is evening.
    pub fn from_hour(hour: u32) -> Self {
        if (5..12).contains(&hour) {
            TimeOfDay::Morning
        } else {
            TimeOfDay::Evening
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn all() -> [TimeOfDay; 2] {
        [TimeOfDay::Morning, TimeOfDay::Evening]
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = VigilError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "morning" => Ok(TimeOfDay::Morning),
            "evening" => Ok(TimeOfDay::Evening),
            other => Err(VigilError::InvalidConfig(format!(
                "unknown time of day '{other}' (expected morning or evening)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PrayerRecord
// ---------------------------------------------------------------------------

/// The daily artifact. A single slot holds the latest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerRecord {
    pub time_of_day: TimeOfDay,
    pub headlines_used: Vec<String>,
    pub prayer_text: String,
}

impl PrayerRecord {
    pub fn load(store: &dyn Store) -> Result<Option<Self>> {
        load_json(store, paths::PRAYER_SLOT)
    }

    /// Like [`PrayerRecord::load`], but absence is an error.
    pub fn load_required(store: &dyn Store) -> Result<Self> {
        Self::load(store)?.ok_or_else(|| {
            VigilError::MissingInputArtifact(format!(
                "{} (run `vigil pray` first)",
                paths::PRAYER_SLOT
            ))
        })
    }

    pub fn save(&self, store: &dyn Store) -> Result<()> {
        save_json(store, paths::PRAYER_SLOT, self)
    }
}

// ---------------------------------------------------------------------------
// MetadataRecord
// ---------------------------------------------------------------------------

/// Publish metadata for one time-of-day series. One slot per [`TimeOfDay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub description: String,
    pub time_of_day: TimeOfDay,
    pub headlines_used: Vec<String>,
    pub prayer_text: String,
}

impl MetadataRecord {
    pub fn load(store: &dyn Store, time_of_day: TimeOfDay) -> Result<Option<Self>> {
        load_json(store, &paths::metadata_slot(time_of_day))
    }

    pub fn save(&self, store: &dyn Store) -> Result<()> {
        save_json(store, &paths::metadata_slot(self.time_of_day), self)
    }
}

// ---------------------------------------------------------------------------
// SpeechMarkupDocument
// ---------------------------------------------------------------------------

/// Speech markup produced during a pipeline run. Never persisted: it feeds a
/// downstream renderer and is surfaced to the operator only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechMarkupDocument {
    pub raw: String,
    pub enhanced: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
