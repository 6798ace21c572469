//! Lazily established backend connection.
//!
//! # Responsibilities
//! - Dial the backend on the first routed call, never at construction
//! - Share one channel with every later call
//! - Remember failed dials and gate redials on the retry policy
//!
//! # State Transitions
//! ```text
//! Empty → Connected: dial succeeds (permanent, channel never replaced)
//! Empty → Failed: dial fails, error cached until retry_at
//! Failed → Connected | Failed: first call after retry_at redials
//! Failed → Exhausted: max_attempts consecutive failures (permanent)
//! Empty | Failed → Exhausted: malformed target or TLS setup (permanent)
//! ```
//!
//! # Design Decisions
//! - The check-and-dial runs under an async mutex: at most one dial in flight
//! - Callers queued behind a dial observe its outcome instead of redialing,
//!   even when the backoff window has already elapsed
//! - The connected channel lives in a `OnceLock` so the hot path takes no lock

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tonic::transport::Channel;

use crate::director::context::CallContext;
use crate::director::dial::{BackendTarget, Dial};
use crate::director::error::DirectorError;
use crate::observability::{metrics, DiagnosticSink};
use crate::resilience::retries::DialRetryPolicy;

#[derive(Debug)]
enum SlotState {
    Empty,
    Failed {
        error: DirectorError,
        failures: u32,
        retry_at: Instant,
    },
    Exhausted(DirectorError),
}

/// The director's single outbound connection slot.
#[derive(Debug)]
pub struct LazyConnection<D> {
    target: BackendTarget,
    dialer: D,
    connect_timeout: Duration,
    policy: DialRetryPolicy,
    ready: OnceLock<Channel>,
    state: Mutex<SlotState>,
    /// Count of completed failed dials, bumped while holding `state`.
    generation: AtomicU64,
}

impl<D: Dial> LazyConnection<D> {
    pub fn new(
        target: BackendTarget,
        dialer: D,
        connect_timeout: Duration,
        policy: DialRetryPolicy,
    ) -> Self {
        Self {
            target,
            dialer,
            connect_timeout,
            policy,
            ready: OnceLock::new(),
            state: Mutex::new(SlotState::Empty),
            generation: AtomicU64::new(0),
        }
    }

    pub fn target(&self) -> &BackendTarget {
        &self.target
    }

    /// True once a dial has succeeded.
    pub fn is_connected(&self) -> bool {
        self.ready.get().is_some()
    }

    /// Return the shared channel, dialing it first if needed.
    ///
    /// Gives up with [`DirectorError::Cancelled`] if the call's scope is
    /// cancelled while waiting; the slot is left as it was.
    pub async fn get(
        &self,
        call: &CallContext,
        sink: &DiagnosticSink,
    ) -> Result<Channel, DirectorError> {
        if let Some(channel) = self.ready.get() {
            return Ok(channel.clone());
        }

        let seen = self.generation.load(Ordering::Acquire);
        let mut state = tokio::select! {
            state = self.state.lock() => state,
            _ = call.scope().cancelled() => return Err(DirectorError::Cancelled),
        };

        // Another caller may have connected while we waited for the lock.
        if let Some(channel) = self.ready.get() {
            return Ok(channel.clone());
        }

        let failures = match &*state {
            SlotState::Empty => 0,
            SlotState::Exhausted(error) => return Err(error.clone()),
            SlotState::Failed {
                error,
                failures,
                retry_at,
            } => {
                // A dial finished while we queued: share its outcome.
                let superseded = self.generation.load(Ordering::Acquire) != seen;
                if superseded || Instant::now() < *retry_at {
                    return Err(error.clone());
                }
                *failures
            }
        };

        sink.emit(|| {
            tracing::info!(
                call_id = %call.call_id(),
                target = %self.target,
                attempt = failures + 1,
                "gRPC dialing backend"
            )
        });

        let started = Instant::now();
        let outcome = tokio::select! {
            outcome = tokio::time::timeout(self.connect_timeout, self.dialer.dial(&self.target)) => outcome,
            _ = call.scope().cancelled() => {
                sink.emit(|| {
                    tracing::info!(
                        call_id = %call.call_id(),
                        target = %self.target,
                        "Dial abandoned, inbound call cancelled"
                    )
                });
                return Err(DirectorError::Cancelled);
            }
        };

        let (error, permanent) = match outcome {
            Ok(Ok(channel)) => {
                metrics::record_dial("connected", started.elapsed());
                sink.emit(|| {
                    tracing::info!(
                        call_id = %call.call_id(),
                        target = %self.target,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "gRPC connected to backend"
                    )
                });
                let channel = self.ready.get_or_init(|| channel).clone();
                *state = SlotState::Empty;
                return Ok(channel);
            }
            Ok(Err(err)) => (
                DirectorError::Dial {
                    target: self.target.to_string(),
                    reason: err.describe(),
                },
                err.is_permanent(),
            ),
            Err(_) => (
                DirectorError::DialTimeout {
                    target: self.target.to_string(),
                    timeout: self.connect_timeout,
                },
                false,
            ),
        };
        metrics::record_dial(error.outcome(), started.elapsed());
        self.generation.fetch_add(1, Ordering::Release);

        if permanent {
            sink.emit(|| {
                tracing::warn!(
                    call_id = %call.call_id(),
                    target = %self.target,
                    error = %error,
                    "gRPC did not connect to backend, target unusable"
                )
            });
            *state = SlotState::Exhausted(error.clone());
            return Err(error);
        }

        let failures = failures + 1;
        if self.policy.is_exhausted(failures) {
            let error = DirectorError::RetryExhausted {
                target: self.target.to_string(),
                attempts: failures,
                reason: error.to_string(),
            };
            sink.emit(|| {
                tracing::warn!(
                    call_id = %call.call_id(),
                    target = %self.target,
                    attempts = failures,
                    error = %error,
                    "gRPC did not connect to backend, giving up"
                )
            });
            *state = SlotState::Exhausted(error.clone());
            return Err(error);
        }

        let delay = self.policy.next_delay(failures);
        sink.emit(|| {
            tracing::warn!(
                call_id = %call.call_id(),
                target = %self.target,
                attempts = failures,
                retry_in_ms = delay.as_millis() as u64,
                error = %error,
                "gRPC did not connect to backend"
            )
        });
        *state = SlotState::Failed {
            error: error.clone(),
            failures,
            retry_at: Instant::now() + delay,
        };
        Err(error)
    }
}
