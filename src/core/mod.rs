//! Core chat components
//!
//! This module contains the per-turn orchestration and the file-backed
//! memory the tools operate on.

mod chat;
mod memory;

pub use chat::{is_exit_command, ChatEngine, ChatError};
pub use memory::{MemoryStore, MEMORY_EMPTY, MEMORY_EMPTY_NO_ENTRIES};
