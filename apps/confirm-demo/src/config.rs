//! Environment configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Answer given to the first dialog.
    pub auto_answer: bool,
    /// Answer given to the "are you sure?" dialog; falls back to
    /// `auto_answer`.
    pub nested_answer: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let auto_answer = env_answer("CONFIRM_DEMO_AUTO_ANSWER").unwrap_or(true);
        Self {
            auto_answer,
            nested_answer: env_answer("CONFIRM_DEMO_NESTED_ANSWER").unwrap_or(auto_answer),
        }
    }
}

fn env_answer(key: &str) -> Option<bool> {
    let value = env::var(key).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" | "true" => Some(true),
        "0" | "n" | "no" | "false" => Some(false),
        "" => None,
        other => {
            log::warn!("{key}={other:?} is not a yes/no answer; ignoring");
            None
        }
    }
}
