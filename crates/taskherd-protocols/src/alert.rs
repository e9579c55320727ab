//! Alerting protocol.

use async_trait::async_trait;

use crate::error::AlertError;

/// External alerting collaborator (chat bot, pager, webhook).
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Deliver a short failure summary.
    async fn alert(&self, summary: &str) -> Result<(), AlertError>;
}

/// Sink used when no alerting channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlertSink;

#[async_trait]
impl AlertSink for NoopAlertSink {
    fn name(&self) -> &str {
        "noop"
    }

    async fn alert(&self, _summary: &str) -> Result<(), AlertError> {
        Ok(())
    }
}
