pub mod context;
pub mod conversation;
pub mod loop_;
pub mod parser;
pub mod registry;

pub use context::ContextBuilder;
pub use conversation::Conversation;
pub use loop_::{AgentEvent, AgentLoop, TurnOutcome};
pub use parser::{ParsedReply, ToolCall, ToolCallError, parse_reply};
pub use registry::ToolRegistry;
