//! Chat engine with tool calling orchestration
//!
//! One user turn runs as a fixed sequence: send the history with the
//! tool catalogue, execute any requested tool calls against the memory
//! store, then ask the model once more without tools for the final
//! answer. Tools are not re-offered on the second call, so a turn
//! performs at most one round of tool execution.

use tracing::debug;

use crate::conversation::Message;
use crate::providers::{CompletionService, ProviderError};
use crate::tools::ToolRegistry;

/// Errors from the chat engine
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Per-turn orchestration over a completion service and the tool registry
pub struct ChatEngine<P> {
    provider: P,
    tools: ToolRegistry,
}

impl<P: CompletionService> ChatEngine<P> {
    pub fn new(provider: P, tools: ToolRegistry) -> Self {
        Self { provider, tools }
    }

    /// Run one user turn against the given history and return the
    /// assistant's answer.
    ///
    /// The history is owned by the caller and only ever appended to; on
    /// error it retains everything appended before the failure, so the
    /// next turn continues from a consistent state.
    pub async fn run_turn(
        &self,
        history: &mut Vec<Message>,
        input: &str,
    ) -> Result<String, ChatError> {
        history.push(Message::user(input));

        let catalogue = self.tools.definitions();
        let reply = self.provider.complete(history, Some(&catalogue)).await?;

        if !reply.has_tool_calls() {
            let answer = reply.content;
            history.push(Message::assistant(answer.clone()));
            return Ok(answer);
        }

        let calls = reply.tool_calls.clone().unwrap_or_default();
        debug!(count = calls.len(), "model requested tool calls");

        // The raw assistant message, still carrying its tool_calls,
        // must precede the tool results in history.
        history.push(reply);

        for call in &calls {
            debug!(tool = %call.name, id = %call.id, "dispatching tool call");
            let result = self.tools.dispatch(&call.name, &call.arguments);
            history.push(Message::tool_result(&call.id, result));
        }

        // Second round goes out without the catalogue.
        let final_reply = self.provider.complete(history, None).await?;
        let answer = final_reply.content;
        history.push(Message::assistant(answer.clone()));
        Ok(answer)
    }
}

/// True when the input asks to end the session.
pub fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Role, ToolCall};
    use crate::core::MemoryStore;
    use crate::tools::ToolDefinition;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Completion service that replays scripted replies and records
    /// whether each call offered tools.
    struct ScriptedService {
        replies: Mutex<VecDeque<Message>>,
        tools_offered: Mutex<Vec<bool>>,
    }

    impl ScriptedService {
        fn new(replies: Vec<Message>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                tools_offered: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<bool> {
            self.tools_offered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(
            &self,
            _messages: &[Message],
            tools: Option<&[ToolDefinition]>,
        ) -> Result<Message, ProviderError> {
            self.tools_offered.lock().unwrap().push(tools.is_some());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ProviderError::InvalidResponse("script exhausted".into()))
        }
    }

    fn engine_in(
        dir: &tempfile::TempDir,
        replies: Vec<Message>,
    ) -> ChatEngine<ScriptedService> {
        let memory = MemoryStore::new(dir.path().join("memory.txt"));
        ChatEngine::new(ScriptedService::new(replies), ToolRegistry::new(memory))
    }

    fn assistant_with_call(name: &str, arguments: &str) -> Message {
        Message {
            role: Role::Assistant,
            content: String::new(),
            tool_call_id: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".into(),
                name: name.into(),
                arguments: arguments.into(),
            }]),
        }
    }

    #[tokio::test]
    async fn test_direct_answer_turn_makes_one_call() {
        let dir = tempdir().unwrap();
        let engine = engine_in(&dir, vec![Message::assistant("Hello!")]);
        let mut history = vec![Message::system("sys")];

        let answer = engine.run_turn(&mut history, "hi").await.unwrap();

        assert_eq!(answer, "Hello!");
        assert_eq!(engine.provider.calls(), vec![true]);
        // system + user + assistant
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content, "Hello!");
    }

    #[tokio::test]
    async fn test_tool_turn_makes_two_calls_and_writes_memory() {
        let dir = tempdir().unwrap();
        let engine = engine_in(
            &dir,
            vec![
                assistant_with_call("write_to_memory", r#"{"content": "likes tea"}"#),
                Message::assistant("Noted."),
            ],
        );
        let mut history = vec![Message::system("sys")];

        let answer = engine.run_turn(&mut history, "remember I like tea").await.unwrap();

        assert_eq!(answer, "Noted.");
        // First call offers tools, the second withholds them.
        assert_eq!(engine.provider.calls(), vec![true, false]);

        // system, user, raw assistant (with calls), tool result, final assistant
        assert_eq!(history.len(), 5);
        assert!(history[2].has_tool_calls());
        assert_eq!(history[3].role, Role::Tool);
        assert_eq!(history[3].tool_call_id.as_deref(), Some("call_1"));
        assert!(history[3].content.contains("likes tea"));
        assert_eq!(history[4].content, "Noted.");

        let log = std::fs::read_to_string(dir.path().join("memory.txt")).unwrap();
        assert!(log.contains("likes tea"));
    }

    #[tokio::test]
    async fn test_unknown_tool_still_completes_the_turn() {
        let dir = tempdir().unwrap();
        let engine = engine_in(
            &dir,
            vec![
                assistant_with_call("summon_demon", "{}"),
                Message::assistant("Sorry, I cannot do that."),
            ],
        );
        let mut history = Vec::new();

        let answer = engine.run_turn(&mut history, "do it").await.unwrap();

        assert_eq!(answer, "Sorry, I cannot do that.");
        assert_eq!(history[2].content, "Unknown function: summon_demon");
        assert!(!dir.path().join("memory.txt").exists());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_in_tool_result_and_turn_completes() {
        // Point the store at a directory so appends fail.
        let dir = tempdir().unwrap();
        let memory = MemoryStore::new(dir.path());
        let engine = ChatEngine::new(
            ScriptedService::new(vec![
                assistant_with_call("write_to_memory", r#"{"content": "doomed"}"#),
                Message::assistant("I could not save that."),
            ]),
            ToolRegistry::new(memory),
        );
        let mut history = Vec::new();

        let answer = engine.run_turn(&mut history, "remember").await.unwrap();

        assert_eq!(answer, "I could not save that.");
        assert!(history[2].content.starts_with("Error writing to memory:"));
        assert_eq!(engine.provider.calls(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_history_up_to_user_message() {
        let dir = tempdir().unwrap();
        let engine = engine_in(&dir, Vec::new());
        let mut history = vec![Message::system("sys")];

        let err = engine.run_turn(&mut history, "hello").await.unwrap_err();

        assert!(matches!(err, ChatError::Provider(_)));
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::User);
    }

    #[test]
    fn test_exit_commands_case_insensitive() {
        for input in ["exit", "quit", "EXIT", "Quit", "  quit  "] {
            assert!(is_exit_command(input), "{input:?} should exit");
        }
        for input in ["exits", "q", "please quit", ""] {
            assert!(!is_exit_command(input), "{input:?} should not exit");
        }
    }
}
