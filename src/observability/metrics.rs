//! Metrics collection and exposition.
//!
//! # Metrics
//! - `director_decisions_total` (counter): routing decisions by outcome
//! - `director_dials_total` (counter): backend dial attempts by result
//! - `director_dial_duration_seconds` (histogram): dial latency
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Outcome labels are a small closed set

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::ObservabilityError;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), ObservabilityError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of one routing decision.
pub fn record_decision(outcome: &'static str) {
    counter!("director_decisions_total", "outcome" => outcome).increment(1);
}

/// Record a finished dial attempt.
pub fn record_dial(result: &'static str, elapsed: Duration) {
    counter!("director_dials_total", "result" => result).increment(1);
    histogram!("director_dial_duration_seconds").record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decisions_counted_by_outcome() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_decision("forwarded");
            record_decision("forwarded");
            record_decision("unimplemented");
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"director_decisions_total{outcome="forwarded"} 2"#));
        assert!(rendered.contains(r#"director_decisions_total{outcome="unimplemented"} 1"#));
    }

    #[test]
    fn test_dials_counted_by_result() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_dial("connected", Duration::from_millis(12));
            record_dial("dial_timeout", Duration::from_secs(5));
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"director_dials_total{result="connected"} 1"#));
        assert!(rendered.contains(r#"director_dials_total{result="dial_timeout"} 1"#));
        assert!(rendered.contains("director_dial_duration_seconds"));
    }
}
