pub mod agent;
pub mod config;
pub mod providers;
pub mod tools;
pub mod traits;

pub use agent::{AgentEvent, AgentLoop, ContextBuilder, Conversation, ToolRegistry, TurnOutcome};
pub use config::Config;
pub use providers::*;
pub use traits::*;
