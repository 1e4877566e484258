use crate::agent::conversation::Conversation;
use crate::agent::parser::{ParsedReply, ToolCall, ToolCallError, parse_reply};
use crate::agent::registry::ToolRegistry;
use crate::traits::{ChatRequest, Provider, ToolResult};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_MAX_STEPS: usize = 20;
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Progress within a turn, for display. The loop itself never prints.
#[derive(Debug, Clone, Copy)]
pub enum AgentEvent<'a> {
    Thinking(&'a str),
    ToolCall(&'a ToolCall),
    ToolResult {
        call: &'a ToolCall,
        result: &'a ToolResult,
    },
    MalformedCall(&'a ToolCallError),
    StepLimitReached(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered without a tool call; control returns to the user.
    Reply(String),
    StepLimitReached { steps: usize },
}

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    tool_registry: Arc<ToolRegistry>,
    max_steps: usize,
    temperature: f64,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn Provider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tool_registry,
            max_steps: DEFAULT_MAX_STEPS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Caps how many tool calls (well-formed or not) one user turn may trigger.
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub async fn process(&self, conversation: &mut Conversation, input: &str) -> Result<TurnOutcome> {
        self.run_turn(conversation, input, |_| {}).await
    }

    /// Runs one user turn to completion: request, parse, execute, repeat
    /// until the model replies without a tool call or the step limit is hit.
    ///
    /// Provider failures are returned as `Err`; everything tool-related is
    /// fed back into `conversation` instead.
    pub async fn run_turn<F>(
        &self,
        conversation: &mut Conversation,
        input: &str,
        mut on_event: F,
    ) -> Result<TurnOutcome>
    where
        F: FnMut(AgentEvent<'_>),
    {
        conversation.push_user(input);
        let mut steps = 0;

        loop {
            let reply = self.complete(conversation).await?;

            match parse_reply(&reply) {
                ParsedReply::Plain => {
                    conversation.push_assistant(reply.as_str());
                    return Ok(TurnOutcome::Reply(reply));
                }
                ParsedReply::Call { thinking, call } => {
                    conversation.push_assistant(reply.as_str());
                    if !thinking.is_empty() {
                        on_event(AgentEvent::Thinking(&thinking));
                    }
                    on_event(AgentEvent::ToolCall(&call));

                    if steps >= self.max_steps {
                        return Ok(self.stop_at_limit(conversation, steps, &mut on_event));
                    }
                    steps += 1;

                    let result = self.tool_registry.execute(&call).await;
                    on_event(AgentEvent::ToolResult {
                        call: &call,
                        result: &result,
                    });
                    conversation.push_tool_result(&result.to_text());
                }
                ParsedReply::Malformed { thinking, error } => {
                    warn!(%error, "model sent a malformed tool call");
                    conversation.push_assistant(reply.as_str());
                    if !thinking.is_empty() {
                        on_event(AgentEvent::Thinking(&thinking));
                    }
                    on_event(AgentEvent::MalformedCall(&error));

                    if steps >= self.max_steps {
                        return Ok(self.stop_at_limit(conversation, steps, &mut on_event));
                    }
                    steps += 1;

                    conversation.push_tool_result(&format!(
                        "Error: could not parse tool call: {}",
                        error
                    ));
                }
            }
        }
    }

    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        debug!(
            messages = conversation.len(),
            provider = self.provider.name(),
            model = self.provider.model(),
            "requesting completion"
        );

        let request = ChatRequest {
            messages: conversation.messages(),
            temperature: self.temperature,
        };
        let response = self
            .provider
            .chat(request)
            .await
            .with_context(|| format!("{} completion request failed", self.provider.name()))?;

        Ok(response.text_or_empty().to_string())
    }

    fn stop_at_limit<F>(&self, conversation: &mut Conversation, steps: usize, on_event: &mut F) -> TurnOutcome
    where
        F: FnMut(AgentEvent<'_>),
    {
        warn!(steps, "tool call limit reached for this turn");
        conversation.push_tool_result(&format!(
            "Error: limit of {} tool calls per turn reached; this call was not executed. \
             Summarize your progress for the user in plain text.",
            self.max_steps
        ));
        on_event(AgentEvent::StepLimitReached(steps));
        TurnOutcome::StepLimitReached { steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatMessage, ChatResponse, Role};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
        repeat_last: bool,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(vec![]),
                repeat_last: false,
            })
        }

        fn repeating(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(VecDeque::from([reply.to_string()])),
                requests: Mutex::new(vec![]),
                repeat_last: true,
            })
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            self.requests
                .lock()
                .unwrap()
                .push(request.messages.to_vec());
            let mut replies = self.replies.lock().unwrap();
            let reply = if self.repeat_last {
                replies.front().cloned()
            } else {
                replies.pop_front()
            };
            match reply {
                Some(text) => Ok(ChatResponse { text: Some(text) }),
                None => anyhow::bail!("script exhausted"),
            }
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn chat(&self, _request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
            anyhow::bail!("401 Unauthorized")
        }
    }

    fn agent(provider: Arc<dyn Provider>, dir: &TempDir) -> AgentLoop {
        AgentLoop::new(
            provider,
            Arc::new(ToolRegistry::with_builtin_tools(dir.path())),
        )
    }

    #[tokio::test]
    async fn creates_file_then_returns_to_user() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&[
            "I'll create it.\n<tool_call>\n{\"name\": \"edit\", \"input\": {\"path\": \"notes.txt\", \"old\": \"\", \"new\": \"hello\"}}\n</tool_call>",
            "Created notes.txt with the content hello.",
        ]);
        let agent = agent(provider.clone(), &tmp);
        let mut conversation = Conversation::new("sys");

        let mut thinking = vec![];
        let outcome = agent
            .run_turn(
                &mut conversation,
                "create a file named notes.txt with content hello",
                |event| {
                    if let AgentEvent::Thinking(text) = event {
                        thinking.push(text.to_string());
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Reply("Created notes.txt with the content hello.".to_string())
        );
        assert_eq!(thinking, vec!["I'll create it."]);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("notes.txt")).unwrap(),
            "hello"
        );

        let messages = conversation.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3], ChatMessage::user("Tool result:\nCreated notes.txt"));
        assert_eq!(messages[4].role, Role::Assistant);
    }

    #[tokio::test]
    async fn full_transcript_is_resent_each_request() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&[
            "<tool_call>{\"name\": \"list\", \"input\": {}}</tool_call>",
            "The directory is empty.",
        ]);
        let agent = agent(provider.clone(), &tmp);
        let mut conversation = Conversation::new("sys");

        agent.process(&mut conversation, "what's here?").await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].len(), 2);
        assert_eq!(requests[1].len(), 4);
        assert_eq!(requests[1][..2], requests[0][..]);
        assert_eq!(requests[1][3].content, "Tool result:\n[]");
    }

    #[tokio::test]
    async fn deleting_missing_file_reports_success() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&[
            "<tool_call>{\"name\": \"delete\", \"input\": {\"path\": \"old.log\"}}</tool_call>",
            "old.log was already gone.",
        ]);
        let agent = agent(provider, &tmp);
        let mut conversation = Conversation::new("sys");

        let mut results = vec![];
        agent
            .run_turn(&mut conversation, "delete old.log", |event| {
                if let AgentEvent::ToolResult { result, .. } = event {
                    results.push(result.clone());
                }
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(
            conversation.messages()[3].content,
            "Tool result:\nold.log does not exist; nothing to delete"
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_fed_back() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&[
            "<tool_call>{\"name\": \"shell\", \"input\": {\"command\": \"ls\"}}</tool_call>",
            "I can't run shell commands.",
        ]);
        let agent = agent(provider, &tmp);
        let mut conversation = Conversation::new("sys");

        let outcome = agent.process(&mut conversation, "run ls").await.unwrap();

        assert!(matches!(outcome, TurnOutcome::Reply(_)));
        assert!(
            conversation.messages()[3]
                .content
                .starts_with("Tool result:\nError: Unknown tool 'shell'")
        );
    }

    #[tokio::test]
    async fn malformed_call_is_fed_back_for_correction() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&[
            "<tool_call>{\"name\": \"list\", \"input\": </tool_call>",
            "<tool_call>{\"name\": \"list\", \"input\": {}}</tool_call>",
            "Nothing here.",
        ]);
        let agent = agent(provider, &tmp);
        let mut conversation = Conversation::new("sys");

        let mut malformed = 0;
        let mut calls = 0;
        agent
            .run_turn(&mut conversation, "list files", |event| match event {
                AgentEvent::MalformedCall(_) => malformed += 1,
                AgentEvent::ToolCall(_) => calls += 1,
                _ => {}
            })
            .await
            .unwrap();

        assert_eq!((malformed, calls), (1, 1));
        assert!(
            conversation.messages()[3]
                .content
                .starts_with("Tool result:\nError: could not parse tool call: invalid tool call JSON")
        );
    }

    #[tokio::test]
    async fn step_limit_stops_a_looping_model() {
        let tmp = TempDir::new().unwrap();
        let provider =
            ScriptedProvider::repeating("<tool_call>{\"name\": \"list\", \"input\": {}}</tool_call>");
        let agent = agent(provider.clone(), &tmp).with_max_steps(2);
        let mut conversation = Conversation::new("sys");

        let mut limit_events = vec![];
        let outcome = agent
            .run_turn(&mut conversation, "loop forever", |event| {
                if let AgentEvent::StepLimitReached(steps) = event {
                    limit_events.push(steps);
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome, TurnOutcome::StepLimitReached { steps: 2 });
        assert_eq!(limit_events, vec![2]);
        assert_eq!(provider.requests().len(), 3);
        let last = conversation.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("limit of 2 tool calls per turn reached"));
    }

    #[tokio::test]
    async fn plain_reply_needs_no_tools() {
        let tmp = TempDir::new().unwrap();
        let provider = ScriptedProvider::new(&["Hi there."]);
        let agent = agent(provider, &tmp);
        let mut conversation = Conversation::new("sys");

        let outcome = agent.process(&mut conversation, "hello").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Reply("Hi there.".to_string()));
        assert_eq!(conversation.len(), 3);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let agent = agent(Arc::new(FailingProvider), &tmp);
        let mut conversation = Conversation::new("sys");

        let err = agent.process(&mut conversation, "hello").await.unwrap_err();

        assert!(format!("{:#}", err).contains("401 Unauthorized"));
        assert_eq!(conversation.len(), 2);
    }
}
