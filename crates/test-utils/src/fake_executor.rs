use std::sync::{Arc, Mutex};
use std::time::Duration;

use igniter::errors::ExecutionError;
use igniter::task::TaskSpec;

/// Shared log of which leaves actually executed, in start order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    executed: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|n| *n == name)
            .count()
    }

    fn record(&self, name: &str) {
        self.executed.lock().unwrap().push(name.to_string());
    }

    /// A leaf that records itself and succeeds immediately.
    pub fn succeeding(&self, name: &str) -> TaskSpec {
        self.task(name, Duration::ZERO, None)
    }

    /// A leaf that records itself and fails with `diagnostic` as its output.
    pub fn failing(&self, name: &str, diagnostic: &str) -> TaskSpec {
        self.task(name, Duration::ZERO, Some(diagnostic.to_string()))
    }

    /// A leaf that records itself, sleeps for `delay` and succeeds.
    pub fn sleeping(&self, name: &str, delay: Duration) -> TaskSpec {
        self.task(name, delay, None)
    }

    fn task(&self, name: &str, delay: Duration, failure: Option<String>) -> TaskSpec {
        let log = self.clone();
        let label = name.to_string();
        TaskSpec::custom(name, move || {
            log.record(&label);
            let failure = failure.clone();
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match failure {
                    Some(diagnostic) => Err(ExecutionError::Failed {
                        message: "fake task failed".to_string(),
                        diagnostic: Some(diagnostic),
                    }),
                    None => Ok(()),
                }
            }
        })
    }
}
