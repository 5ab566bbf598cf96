pub mod goal_forecaster;
pub mod llm;
pub mod storage;

pub use goal_forecaster::{GoalNarrativeAgent, NarrativeOptions};
pub use llm::{ClaudeClient, LlmClient};
pub use storage::{AgentStorage, Message, Session, SessionStatus};
