use crate::error::{Result, VigilError};
use crate::prompts;
use crate::record::TimeOfDay;
use tracing::info;
use vigil_clients::{ChatModel, ChatParams, ChatRequest};

/// Writes the prayer text from the selected headlines.
///
/// Length and tone are requested from the model, not enforced here.
pub struct NarrativeComposer<'a> {
    model: &'a dyn ChatModel,
    params: &'a ChatParams,
}

impl<'a> NarrativeComposer<'a> {
    pub fn new(model: &'a dyn ChatModel, params: &'a ChatParams) -> Self {
        Self { model, params }
    }

    pub async fn compose(&self, selected: &[String], time_of_day: TimeOfDay) -> Result<String> {
        let prompt = prompts::compose_prompt(selected, time_of_day);
        let request = ChatRequest::new(self.params, prompts::COMPOSE_SYSTEM, prompt);
        let text = self
            .model
            .complete(&request)
            .await
            .map_err(VigilError::model)?
            .trim()
            .to_string();
        info!(%time_of_day, chars = text.chars().count(), "prayer composed");
        Ok(text)
    }
}
