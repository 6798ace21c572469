//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! First routed call:
//!     → dial backend (bounded by connect timeout)
//!     → On failure: retries.rs decides when the next dial may happen
//!       and computes the jittered delay
//!     → After max_attempts consecutive failures the backend is given up on
//! ```
//!
//! # Design Decisions
//! - Failed dials are never retried inside a call; the next call past the backoff window redials
//! - Jittered backoff prevents reconnect storms from many directors
//! - Retry attempts are bounded; exhaustion is permanent until restart

pub mod retries;
