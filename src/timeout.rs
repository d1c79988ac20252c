//! Run deadline
//!
//! A single deadline is established when the process starts and handed to
//! every remote call. Clients bound each call by the remaining budget; once
//! it is spent, whichever call is in flight fails with [`DeadlineExceeded`].
//! There is no other cancellation channel.

use std::time::{Duration, Instant};

/// Deadline expiry, tagged with the operation that hit it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {budget:?} exceeded during {operation}")]
pub struct DeadlineExceeded {
    pub operation: &'static str,
    pub budget: Duration,
}

/// Overall deadline for a run
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start_time: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline that expires `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            start_time: Instant::now(),
            budget,
        }
    }

    /// Total budget this deadline was created with
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time since the deadline started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Time left before expiry (zero once expired)
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Fail if the deadline has passed
    pub fn check(&self, operation: &'static str) -> Result<(), DeadlineExceeded> {
        if self.is_expired() {
            return Err(self.exceeded(operation));
        }
        Ok(())
    }

    /// The error reported when `operation` runs out of time
    pub fn exceeded(&self, operation: &'static str) -> DeadlineExceeded {
        DeadlineExceeded {
            operation,
            budget: self.budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_deadline_is_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(30));
        assert!(!deadline.is_expired());
        assert!(deadline.remaining() <= Duration::from_secs(30));
        assert!(deadline.check("CreateJobTemplate").is_ok());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);

        let err = deadline.check("PutParameter").unwrap_err();
        assert_eq!(err.operation, "PutParameter");
        assert!(err.to_string().contains("PutParameter"));
    }

    #[test]
    fn test_expires_after_budget() {
        let deadline = Deadline::after(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));
        assert!(deadline.is_expired());
        assert!(deadline.elapsed() >= Duration::from_millis(10));
    }
}
