//! Failure injection for the in-process service doubles

use std::collections::HashMap;
use std::time::Duration;

use crate::client::{ClientError, Operation};

/// Failure configuration for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Error message to return (if any)
    pub error_message: Option<String>,
    /// Delay to add before responding
    pub delay: Option<Duration>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that returns a service error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            delay: None,
            fail_count: None,
        }
    }

    /// Create a config that just adds delay
    pub fn delay(duration: Duration) -> Self {
        Self {
            error_message: None,
            delay: Some(duration),
            fail_count: None,
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }

    /// The error this config produces for `op`, if it produces one
    pub fn to_error(&self, op: Operation) -> Option<ClientError> {
        self.error_message
            .as_ref()
            .map(|message| ClientError::service(op, message.clone()))
    }
}

/// Per-operation failure injector
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<Operation, FailureConfig>,
    call_counts: HashMap<Operation, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for an operation
    pub fn inject(&mut self, op: Operation, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    /// Inject an error for an operation
    pub fn inject_error(&mut self, op: Operation, message: impl Into<String>) {
        self.inject(op, FailureConfig::error(message));
    }

    /// Inject a delay for an operation
    pub fn inject_delay(&mut self, op: Operation, delay: Duration) {
        self.inject(op, FailureConfig::delay(delay));
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Check if a failure should occur for an operation
    pub fn check(&mut self, op: Operation) -> Option<&FailureConfig> {
        let config = self.configs.get(&op)?;
        let count = self.call_counts.entry(op).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }
        Some(config)
    }

    /// Apply any injected delay or error for `op`
    pub fn apply(&mut self, op: Operation) -> Result<(), ClientError> {
        let Some(config) = self.check(op) else {
            return Ok(());
        };
        if let Some(delay) = config.delay {
            std::thread::sleep(delay);
        }
        match config.to_error(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
