use crate::cache::SourceCache;
use crate::config::NewsConfig;
use crate::error::{Result, VigilError};
use crate::prompts;
use chrono::NaiveDate;
use tracing::info;
use vigil_clients::{ChatModel, ChatParams, ChatRequest};

/// Upper bound on headlines handed to composition.
pub const MAX_SELECTED: usize = 5;

/// Narrows the two headline sets to a short, model-ranked list.
pub struct HeadlineSelector<'a> {
    model: &'a dyn ChatModel,
    params: &'a ChatParams,
    policy: &'a str,
}

impl<'a> HeadlineSelector<'a> {
    pub fn new(model: &'a dyn ChatModel, params: &'a ChatParams, policy: &'a str) -> Self {
        Self {
            model,
            params,
            policy,
        }
    }

    pub async fn select(
        &self,
        topic: &[String],
        general: &[String],
        reference_date: NaiveDate,
    ) -> Result<Vec<String>> {
        let date = reference_date.format("%Y-%m-%d").to_string();
        let prompt = prompts::selection_prompt(self.policy, &date, topic, general);
        let request = ChatRequest::new(self.params, prompts::SELECT_SYSTEM, prompt);
        let reply = self
            .model
            .complete(&request)
            .await
            .map_err(VigilError::model)?;
        let selected = parse_selection(&reply);
        info!(
            offered = topic.len() + general.len(),
            selected = selected.len(),
            "headlines selected"
        );
        Ok(selected)
    }

    /// Pull both configured queries through the cache, then select.
    pub async fn gather_and_select(
        &self,
        cache: &SourceCache<'_>,
        news: &NewsConfig,
        reference_date: NaiveDate,
    ) -> Result<Vec<String>> {
        let topic = cache.fetch(&news.topic.endpoint, &news.topic.query).await?;
        let general = cache
            .fetch(&news.general.endpoint, &news.general.query)
            .await?;
        self.select(&topic, &general, reference_date).await
    }
}

/// One headline per non-blank line, trimmed, first [`MAX_SELECTED`] kept.
/// Content is not checked.
pub fn parse_selection(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_SELECTED)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::FsStore;
    use crate::testing::{FakeNews, ScriptedChat};
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn parse_selection_trims_and_bounds() {
        let reply = "\n  first  \n\nsecond\n third\nfourth\nfifth\nsixth\n";
        let got = parse_selection(reply);
        assert_eq!(got, vec!["first", "second", "third", "fourth", "fifth"]);
    }

    #[test]
    fn parse_selection_of_blank_reply_is_empty() {
        assert!(parse_selection("   \n\t\n").is_empty());
        assert!(parse_selection("").is_empty());
    }

    #[test]
    fn parse_selection_never_yields_blank_entries() {
        for reply in ["a\r\n\r\nb", " \u{a0}x ", "1\n2\n3\n4\n5\n6\n7"] {
            let got = parse_selection(reply);
            assert!(got.len() <= MAX_SELECTED);
            assert!(got.iter().all(|h| !h.is_empty() && h.trim() == h));
        }
    }

    #[tokio::test]
    async fn select_sends_policy_and_both_sets() {
        let chat = ScriptedChat::new(["Date: d; Title: X; Description: Y"]);
        let params = ChatParams::new("gpt-4o", 256, 0.2);
        let selector = HeadlineSelector::new(&chat, &params, prompts::DEFAULT_SELECTION_POLICY);
        let got = selector
            .select(&["topic one".into()], &["general one".into()], date())
            .await
            .unwrap();
        assert_eq!(got, vec!["Date: d; Title: X; Description: Y"]);

        let req = &chat.requests()[0];
        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.max_tokens, 256);
        assert_eq!(req.system_prompt(), Some(prompts::SELECT_SYSTEM));
        let user = req.user_prompt().unwrap();
        assert!(user.contains("Today is 2025-01-10"));
        assert!(user.contains("\"topic one\""));
        assert!(user.contains("\"general one\""));
    }

    #[tokio::test]
    async fn model_failure_is_collaborator_unavailable() {
        let chat = ScriptedChat::new(Vec::<String>::new());
        let params = ChatParams::new("gpt-4o", 256, 0.2);
        let err = HeadlineSelector::new(&chat, &params, "p")
            .select(&[], &[], date())
            .await
            .unwrap_err();
        assert!(matches!(err, VigilError::CollaboratorUnavailable { .. }));
    }

    #[tokio::test]
    async fn gather_fetches_both_queries_once() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let news = FakeNews::new()
            .with("everything", r#"{"articles":[{"publishedAt":"d","title":"T"}]}"#)
            .with("top-headlines", r#"{"articles":[{"publishedAt":"d","title":"G"}]}"#);
        let config = Config::default();
        let chat = ScriptedChat::new(["Date: d; Title: T; Description: "]);
        let cache = SourceCache::new(&store, &news, date());
        let selector = HeadlineSelector::new(&chat, &config.stages.select, "policy");

        let got = selector
            .gather_and_select(&cache, &config.news, date())
            .await
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(news.calls(), 2);
        let user = chat.requests()[0].user_prompt().unwrap().to_string();
        assert!(user.contains("Title: T;"));
        assert!(user.contains("Title: G;"));
    }
}
