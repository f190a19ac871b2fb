//! End-to-end time budget for a sponsorship flow.
//!
//! Network stages draw from one shared budget. Waiting on a human (the signing
//! prompt) is simply not run through the budget.

use std::future::Future;
use std::time::Duration;
use tokio::time::{error::Elapsed, timeout, Instant};

/// Remaining time for the bounded stages of one flow.
#[derive(Debug, Clone)]
pub struct FlowBudget {
    remaining: Duration,
}

impl FlowBudget {
    pub fn new(total: Duration) -> Self {
        Self { remaining: total }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Run `fut` against the remaining budget and charge the time it took.
    pub async fn run<F: Future>(&mut self, fut: F) -> Result<F::Output, Elapsed> {
        let started = Instant::now();
        let result = timeout(self.remaining, fut).await;
        self.remaining = self.remaining.saturating_sub(started.elapsed());
        result
    }

    /// Cap a stage-specific limit by what is left.
    pub fn cap(&self, limit: Duration) -> Duration {
        limit.min(self.remaining)
    }
}
