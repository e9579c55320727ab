//! Tracing setup: console output plus an optional daily rolling log file.

use std::sync::OnceLock;

use chrono::{Local, Utc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taskherd_config::{LogTimezone, LoggingConfig};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Timestamps in local time or UTC, decided once at startup.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WallClock {
    utc: bool,
}

impl WallClock {
    pub fn new(timezone: LogTimezone) -> Self {
        Self {
            utc: timezone.resolve() == LogTimezone::Utc,
        }
    }
}

impl FormatTime for WallClock {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        if self.utc {
            write!(w, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
        } else {
            write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `config.level`.
pub(crate) fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let timer = WallClock::new(config.timezone);
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let file_layer = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("taskherd")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_timer(timer)
                    .with_writer(writer)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_timer(timer).with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}
