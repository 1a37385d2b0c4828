//! Tool catalogue and dispatch
//!
//! The model is offered exactly two tools: `write_to_memory` and
//! `read_from_memory`. Dispatch maps a tool-call name plus its raw JSON
//! argument payload onto the corresponding memory operation. Results are
//! always strings; a failed or unrecognized tool never aborts the turn.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::core::MemoryStore;

/// Definition of a tool the model may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (used in tool_call messages).
    pub name: String,

    /// Human-readable description for the model to decide when to use it.
    pub description: String,

    /// JSON Schema describing the expected arguments.
    pub parameters: Value,
}

/// Static registry routing tool calls to the memory store
pub struct ToolRegistry {
    memory: MemoryStore,
}

impl ToolRegistry {
    pub fn new(memory: MemoryStore) -> Self {
        Self { memory }
    }

    /// The catalogue offered to the completion service.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "write_to_memory".to_string(),
                description: "Write important information to memory for future reference"
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "content": {
                            "type": "string",
                            "description": "The content to write to memory"
                        }
                    },
                    "required": ["content"]
                }),
            },
            ToolDefinition {
                name: "read_from_memory".to_string(),
                description: "Read all previously stored information from memory".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
        ]
    }

    /// Route one tool call to its memory operation and return the result.
    ///
    /// Unknown names and unparseable payloads produce informational
    /// strings so the conversation keeps going even when the model
    /// hallucinates a tool or mangles its arguments.
    pub fn dispatch(&self, name: &str, raw_arguments: &str) -> String {
        match name {
            "write_to_memory" => {
                let args: Value = match serde_json::from_str(raw_arguments) {
                    Ok(args) => args,
                    Err(e) => return format!("Error parsing arguments for {name}: {e}"),
                };
                // A missing or non-string `content` degrades to an empty write.
                let content = args.get("content").and_then(Value::as_str).unwrap_or("");
                self.memory.append(content)
            }
            "read_from_memory" => self.memory.read_all(),
            other => {
                warn!(tool = %other, "model requested unknown tool");
                format!("Unknown function: {other}")
            }
        }
    }
}
