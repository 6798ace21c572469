//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Director:
//!     → logging.rs (diagnostic events through the configured sink)
//!     → metrics.rs (decision and dial counters, dial latency)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Director diagnostics go to an explicit sink, silent unless one is given
//! - Call ID flows through every director event
//! - Metrics are cheap (atomic increments) and no-ops without an exporter

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, DiagnosticSink, ObservabilityError};
