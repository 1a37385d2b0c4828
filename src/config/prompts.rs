//! Built-in system prompts

/// Prompts compiled into the binary
pub mod builtin {
    /// System prompt for the memory-augmented assistant.
    pub const MEMORY_ASSISTANT: &str = r#"You are a helpful AI assistant with memory capabilities.

You can remember important information from the conversation and recall it later.
You can write to memory using the 'write_to_memory' function and read from memory using the 'read_from_memory' function."#;
}
