//! Farming assistant service

use shared::{fallback_answer, validate_assistant_question, AssistantAnswer, AssistantQuestion};

use crate::error::AppResult;
use crate::external::AiServiceClient;

/// Answers farmers' questions through the AI assistant, with canned answers as fallback
#[derive(Clone)]
pub struct AssistantService {
    ai_client: AiServiceClient,
}

impl AssistantService {
    pub fn new(ai_client: AiServiceClient) -> Self {
        Self { ai_client }
    }

    /// Answer a question; only invalid input is an error
    pub async fn get_answer(&self, input: AssistantQuestion) -> AppResult<AssistantAnswer> {
        validate_assistant_question(&input)?;
        let language = input.language_or_default();
        tracing::info!("Processing assistant question in {}", language);

        match self
            .ai_client
            .ask_assistant(&input.question, language, input.context.as_deref())
            .await
        {
            Ok(response) => Ok(response.into()),
            Err(e) => {
                tracing::warn!("{}; using canned answer", e);
                Ok(fallback_answer(&input.question, language))
            }
        }
    }
}
