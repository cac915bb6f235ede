use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::Sleeper;

/// Real-time sleeper for the background task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
