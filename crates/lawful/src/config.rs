// Configuration for the effect interpreter
//
// This module provides the options `run_generator_with` accepts.

use serde::{Deserialize, Serialize};

/// Which binding strategy the interpreter may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreference {
    /// Stack-safe when the structure offers `chain_rec` and `map`,
    /// otherwise recursive `chain`
    #[default]
    Auto,
    /// Require `chain_rec` and `map`
    StackSafe,
    /// Always bind through `chain`, even when `chain_rec` is available
    Unsafe,
}

/// Configuration for a single interpreter run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Strategy selection
    pub strategy: StrategyPreference,

    /// Whether to emit a trace event at every suspension point
    pub trace_suspensions: bool,
}

impl RunConfig {
    /// Create a new run configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy preference
    pub fn with_strategy(mut self, strategy: StrategyPreference) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable per-suspension tracing
    pub fn with_trace_suspensions(mut self, enable: bool) -> Self {
        self.trace_suspensions = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.strategy, StrategyPreference::Auto);
        assert!(!config.trace_suspensions);
    }

    #[test]
    fn test_config_builder() {
        let config = RunConfig::new()
            .with_strategy(StrategyPreference::Unsafe)
            .with_trace_suspensions(true);

        assert_eq!(config.strategy, StrategyPreference::Unsafe);
        assert!(config.trace_suspensions);
    }

    #[test]
    fn test_config_from_json() {
        let config: RunConfig = serde_json::from_str(r#"{"strategy": "stack_safe"}"#).unwrap();
        assert_eq!(config.strategy, StrategyPreference::StackSafe);
        assert!(!config.trace_suspensions);
    }
}
