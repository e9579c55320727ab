//! OS signal handling for the daemon process.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::DaemonError;

/// Cancels the daemon's shutdown token on SIGTERM or SIGINT.
///
/// SIGHUP is logged and otherwise ignored: job definitions are fixed for
/// the lifetime of the process.
#[derive(Clone, Default)]
pub struct SignalHandler {
    shutdown: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Install OS signal listeners (Unix).
    #[cfg(unix)]
    pub fn setup_os_signals(&self) -> Result<(), DaemonError> {
        use tokio::signal::unix::SignalKind;

        self.listen(SignalKind::terminate(), "SIGTERM", true)?;
        self.listen(SignalKind::interrupt(), "SIGINT", true)?;
        self.listen(SignalKind::hangup(), "SIGHUP", false)?;

        info!("OS signal handlers installed (SIGTERM, SIGINT, SIGHUP)");
        Ok(())
    }

    #[cfg(unix)]
    fn listen(
        &self,
        kind: tokio::signal::unix::SignalKind,
        name: &'static str,
        shuts_down: bool,
    ) -> Result<(), DaemonError> {
        let mut stream = tokio::signal::unix::signal(kind)
            .map_err(|e| DaemonError::SignalSetup(format!("{name}: {e}")))?;
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if shuts_down {
                    info!("Received {}, shutting down", name);
                    shutdown.cancel();
                } else {
                    info!("Received {}; job definitions are not reloaded, restart to pick up changes", name);
                }
            }
        });
        Ok(())
    }

    /// Install OS signal listeners (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn setup_os_signals(&self) -> Result<(), DaemonError> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received Ctrl+C, shutting down");
                shutdown.cancel();
            }
        });

        info!("OS signal handlers installed (Ctrl+C only)");
        Ok(())
    }
}
