//! Retry policy for the generation step.
//!
//! Stateless, like the rest of the workflow helpers: the attempt counter
//! lives in the caller's loop and the policy only answers "again?" and
//! "what do we tell the generator about the last failure?".

/// Total attempts per generation cycle when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry configuration for one generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    max_attempts: u32,
}

impl RetryConfig {
    /// Build a config with `max_attempts` total attempts, clamped to at least 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Stateless retry handler for generation failures.
pub struct RetryHandler;

impl RetryHandler {
    /// Determine whether another attempt should be made.
    ///
    /// `attempt` is 1-based (first execution is attempt 1).
    pub fn should_retry(config: &RetryConfig, attempt: u32) -> bool {
        attempt < config.max_attempts
    }

    /// Text carried into the next attempt's request.
    ///
    /// Only the immediately preceding error is carried; earlier errors are
    /// not accumulated.
    pub fn prior_error_note(error: &str) -> String {
        format!("Error occurred: {error}")
    }
}
