use crate::error::{Result, VigilError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vigil_clients::{ChatParams, RetryPolicy, NEWS_API_URL, OPENAI_API_URL};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// NewsConfig
// ---------------------------------------------------------------------------

/// One headline query: an API endpoint plus a pre-encoded query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub endpoint: String,
    pub query: String,
}

impl NewsQuery {
    pub fn new(endpoint: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Topic-scoped query, ordered by popularity.
    #[serde(default = "default_topic_query")]
    pub topic: NewsQuery,
    /// General national headlines.
    #[serde(default = "default_general_query")]
    pub general: NewsQuery,
}

fn default_news_base_url() -> String {
    NEWS_API_URL.to_string()
}

fn default_topic_query() -> NewsQuery {
    NewsQuery::new("everything", "q=Trump&sortBy=popularity")
}

fn default_general_query() -> NewsQuery {
    NewsQuery::new("top-headlines", "country=us")
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            topic: default_topic_query(),
            general: default_general_query(),
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_openai_base_url() -> String {
    OPENAI_API_URL.to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// StageConfig
// ---------------------------------------------------------------------------

/// Generation parameters for each model-backed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "default_select")]
    pub select: ChatParams,
    #[serde(default = "default_compose")]
    pub compose: ChatParams,
    #[serde(default = "default_enhance")]
    pub enhance: ChatParams,
    #[serde(default = "default_metadata")]
    pub metadata: ChatParams,
}

fn default_select() -> ChatParams {
    ChatParams::new("gpt-4o", 256, 0.2)
}

fn default_compose() -> ChatParams {
    ChatParams::new("gpt-4o", 2048, 0.7)
}

fn default_enhance() -> ChatParams {
    ChatParams::new("gpt-4", 2048, 0.2)
}

fn default_metadata() -> ChatParams {
    ChatParams::new("gpt-4", 300, 0.7)
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            select: default_select(),
            compose: default_compose(),
            enhance: default_enhance(),
            metadata: default_metadata(),
        }
    }
}

impl StageConfig {
    fn named(&self) -> [(&'static str, &ChatParams); 4] {
        [
            ("select", &self.select),
            ("compose", &self.compose),
            ("enhance", &self.enhance),
            ("metadata", &self.metadata),
        ]
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Replacement selection policy. `{reference_date}` is substituted with
    /// the run date; the text is otherwise passed to the model unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

// ---------------------------------------------------------------------------
// MarkupConfig
// ---------------------------------------------------------------------------

/// Who picks the randomized pause lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// The model randomizes pauses and annotates pronunciation in one call.
    #[default]
    Model,
    /// Pauses are sampled locally; the model only annotates pronunciation.
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkupConfig {
    #[serde(default)]
    pub pacing: PacingMode,
}

// ---------------------------------------------------------------------------
// MetadataConfig
// ---------------------------------------------------------------------------

/// How the title/description reply is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Leading labels stripped; both parts must be non-empty.
    #[default]
    Strict,
    /// Every `Title:`/`Description:` occurrence removed; empties accepted.
    Legacy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesNames {
    #[serde(default = "default_morning_series")]
    pub morning: String,
    #[serde(default = "default_evening_series")]
    pub evening: String,
}

fn default_morning_series() -> String {
    "Dawn of Hope".to_string()
}

fn default_evening_series() -> String {
    "Evening Grace".to_string()
}

impl Default for SeriesNames {
    fn default() -> Self {
        Self {
            morning: default_morning_series(),
            evening: default_evening_series(),
        }
    }
}

impl SeriesNames {
    pub fn for_slot(&self, time_of_day: crate::record::TimeOfDay) -> &str {
        match time_of_day {
            crate::record::TimeOfDay::Morning => &self.morning,
            crate::record::TimeOfDay::Evening => &self.evening,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default)]
    pub parse_mode: ParseMode,
    #[serde(default)]
    pub series: SeriesNames,
}

// ---------------------------------------------------------------------------
// HttpConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            news: NewsConfig::default(),
            openai: OpenAiConfig::default(),
            stages: StageConfig::default(),
            selection: SelectionConfig::default(),
            markup: MarkupConfig::default(),
            metadata: MetadataConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load `.vigil/config.yaml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        // 1. Every stage needs a model and a non-zero output budget
        for (stage, params) in self.stages.named() {
            if params.model.trim().is_empty() {
                error(format!("stages.{stage}.model is empty"));
            }
            if params.max_tokens == 0 {
                error(format!("stages.{stage}.max_tokens must be greater than 0"));
            }
            if !(0.0..=2.0).contains(&params.temperature) {
                error(format!(
                    "stages.{stage}.temperature {} is outside 0.0-2.0",
                    params.temperature
                ));
            }
        }

        // 2. Both headline queries must name an endpoint
        for (name, q) in [("topic", &self.news.topic), ("general", &self.news.general)] {
            if q.endpoint.trim().is_empty() {
                error(format!("news.{name}.endpoint is empty"));
            }
        }

        // 3. Series identity must be set for both slots
        for (slot, series) in [
            ("morning", &self.metadata.series.morning),
            ("evening", &self.metadata.series.evening),
        ] {
            if series.trim().is_empty() {
                error(format!("metadata.series.{slot} is empty"));
            }
        }

        // 4. A replacement policy that never mentions the date loses recency
        if let Some(policy) = &self.selection.policy {
            if !policy.contains("{reference_date}") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "selection.policy has no {reference_date} placeholder; \
                              the model will not see today's date"
                        .to_string(),
                });
            }
        }

        // 5. Retry and timeout bounds
        if self.http.max_attempts == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "http.max_attempts is 0; each call is still attempted once".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "http.timeout_secs must be greater than 0".to_string(),
            });
        }

        warnings
    }
}

/// Resolve a required credential supplied by the environment or a flag.
pub fn require_credential(var: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(VigilError::MissingCredential(var.to_string())),
    }
}
