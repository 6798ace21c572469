//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide logging subsystem
//! - Carry the diagnostic sink a director reports to
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level

use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Errors raised while setting up logging or metrics.
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    Ok(())
}

/// Destination for a director's diagnostic events.
///
/// Defaults to a sink that discards everything.
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    dispatch: Dispatch,
}

impl DiagnosticSink {
    /// A sink that drops every event.
    pub fn noop() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// The dispatcher active on the calling thread (the global one after `init_logging`).
    pub fn current() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(|dispatch| dispatch.clone()),
        }
    }

    /// Run `emit` with this sink as the default dispatcher.
    pub fn emit<T>(&self, emit: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, emit)
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::noop()
    }
}

impl From<Dispatch> for DiagnosticSink {
    fn from(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }
}
