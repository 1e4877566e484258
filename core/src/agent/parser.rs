use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TOOL_CALL_START: &str = "<tool_call>";
pub const TOOL_CALL_END: &str = "</tool_call>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, input: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolCallError {
    #[error("missing </tool_call> after <tool_call>")]
    Unterminated,
    #[error("multiple <tool_call> blocks; send exactly one tool call per reply")]
    MultipleBlocks,
    #[error("invalid tool call JSON: {0}")]
    InvalidJson(String),
    #[error("tool call is missing a non-empty \"name\"")]
    MissingName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// No tool call block; the reply goes straight to the user.
    Plain,
    Call { thinking: String, call: ToolCall },
    Malformed {
        thinking: String,
        error: ToolCallError,
    },
}

/// Extracts the text inside the single `<tool_call>...</tool_call>` block,
/// along with the narration that precedes it.
///
/// Returns `Ok(None)` when no block is present.
pub fn extract_block(reply: &str) -> Result<Option<(&str, &str)>, ToolCallError> {
    let Some(start) = reply.find(TOOL_CALL_START) else {
        return Ok(None);
    };
    let body_start = start + TOOL_CALL_START.len();
    let rest = &reply[body_start..];
    let end = rest.find(TOOL_CALL_END).ok_or(ToolCallError::Unterminated)?;

    let after = &rest[end + TOOL_CALL_END.len()..];
    if after.contains(TOOL_CALL_START) {
        return Err(ToolCallError::MultipleBlocks);
    }

    Ok(Some((reply[..start].trim(), rest[..end].trim())))
}

fn parse_call(json: &str) -> Result<ToolCall, ToolCallError> {
    // Tolerate a markdown code fence inside the block.
    let json = json
        .strip_prefix("```json")
        .or_else(|| json.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(json);

    let call: ToolCall =
        serde_json::from_str(json).map_err(|e| ToolCallError::InvalidJson(e.to_string()))?;
    if call.name.trim().is_empty() {
        return Err(ToolCallError::MissingName);
    }
    Ok(ToolCall {
        name: call.name.trim().to_string(),
        input: call.input,
    })
}

pub fn parse_reply(reply: &str) -> ParsedReply {
    let thinking_before = |reply: &str| {
        reply
            .find(TOOL_CALL_START)
            .map(|idx| reply[..idx].trim().to_string())
            .unwrap_or_default()
    };

    match extract_block(reply) {
        Ok(None) => ParsedReply::Plain,
        Ok(Some((thinking, json))) => match parse_call(json) {
            Ok(call) => ParsedReply::Call {
                thinking: thinking.to_string(),
                call,
            },
            Err(error) => ParsedReply::Malformed {
                thinking: thinking.to_string(),
                error,
            },
        },
        Err(error) => ParsedReply::Malformed {
            thinking: thinking_before(reply),
            error,
        },
    }
}
