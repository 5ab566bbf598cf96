pub mod agent;
pub mod parser;
pub mod system_prompt;
pub mod types;

pub use agent::GoalNarrativeAgent;
pub use parser::parse_narrative;
pub use types::{NarrativeOptions, NarrativeResponse};
