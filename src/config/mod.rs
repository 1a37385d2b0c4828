//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the completion service. Deliberately not
    /// validated here: a missing key surfaces on the first call.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub memory_file: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            api_key: env::var("OPENAI_API_KEY").ok(),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: env::var("MNEMO_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            memory_file: env::var("MNEMO_MEMORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("memory.txt")),
        })
    }
}
