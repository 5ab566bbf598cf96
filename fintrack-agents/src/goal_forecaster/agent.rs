use crate::goal_forecaster::parser::parse_narrative;
use crate::goal_forecaster::system_prompt::{build_system_prompt, build_user_message};
use crate::goal_forecaster::types::NarrativeOptions;
use crate::llm::{CompletionRequest, LlmClient, LlmMessage};
use crate::storage::{AgentStorage, Message, Session, SessionStatus};
use anyhow::anyhow;
use shared_types::{GoalPrediction, PredictionNarrative, SavingsGoal};
use std::sync::Arc;

pub const AGENT_TYPE: &str = "goal-forecaster";
const MAX_ATTEMPTS: u32 = 2;

/// Asks the model to explain a deterministic goal forecast.
pub struct GoalNarrativeAgent {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<dyn AgentStorage>,
    options: NarrativeOptions,
}

impl GoalNarrativeAgent {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        storage: Arc<dyn AgentStorage>,
        options: NarrativeOptions,
    ) -> Self {
        Self {
            llm_client,
            storage,
            options,
        }
    }

    /// Run a full session for `goal`: open it, execute, and record the outcome.
    pub async fn narrate(
        &self,
        goal: &SavingsGoal,
        preview: &GoalPrediction,
    ) -> anyhow::Result<PredictionNarrative> {
        let session_id = self
            .storage
            .create_session(Session {
                id: None,
                agent_type: AGENT_TYPE.to_string(),
                model: self.options.model.clone(),
                objective: format!("Explain forecast for goal {}", goal.id),
                context_data: Some(
                    serde_json::json!({
                        "goal_id": goal.id,
                        "user_id": goal.user_id,
                    })
                    .to_string(),
                ),
                status: SessionStatus::Running,
                result: None,
            })
            .await?;

        match self.execute(session_id, goal, preview).await {
            Ok(narrative) => {
                let summary = serde_json::to_string(&narrative).ok();
                if let Err(e) = self
                    .storage
                    .finish_session(session_id, SessionStatus::Completed, summary)
                    .await
                {
                    tracing::warn!("Failed to close agent session {}: {}", session_id, e);
                }
                Ok(narrative)
            }
            Err(err) => {
                if let Err(e) = self
                    .storage
                    .finish_session(session_id, SessionStatus::Failed, Some(err.to_string()))
                    .await
                {
                    tracing::warn!("Failed to close agent session {}: {}", session_id, e);
                }
                Err(err)
            }
        }
    }

    pub async fn execute(
        &self,
        session_id: i64,
        goal: &SavingsGoal,
        preview: &GoalPrediction,
    ) -> anyhow::Result<PredictionNarrative> {
        let system_prompt = build_system_prompt(goal, preview);
        let user_message = build_user_message(goal);

        self.storage
            .create_message(Message {
                id: None,
                session_id,
                role: "user".to_string(),
                content: user_message.clone(),
            })
            .await?;

        let request = CompletionRequest {
            model: self.options.model.clone(),
            max_tokens: self.options.max_tokens,
            messages: vec![LlmMessage::user(user_message)],
            system: Some(system_prompt),
            temperature: Some(0.2),
        };

        let mut last_error = anyhow!("Narrative agent made no attempts");
        for attempt in 1..=MAX_ATTEMPTS {
            tracing::info!("Goal {} narrative attempt {}", goal.id, attempt);

            let outcome =
                tokio::time::timeout(self.options.timeout, self.llm_client.complete(request.clone()))
                    .await;

            match outcome {
                Ok(Ok(response)) => {
                    let text = response.text();
                    self.storage
                        .create_message(Message {
                            id: None,
                            session_id,
                            role: "assistant".to_string(),
                            content: text.clone(),
                        })
                        .await?;

                    return Ok(parse_narrative(&text).unwrap_or_else(|| {
                        tracing::warn!("Goal {} narrative reply had no usable structure", goal.id);
                        PredictionNarrative::default()
                    }));
                }
                Ok(Err(e)) => last_error = e,
                Err(_) => {
                    last_error = anyhow!(
                        "Narrative request timed out after {:?}",
                        self.options.timeout
                    )
                }
            }

            tracing::warn!("Goal {} narrative attempt {} failed: {}", goal.id, attempt, last_error);
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(self.options.retry_backoff).await;
            }
        }

        Err(last_error)
    }
}
