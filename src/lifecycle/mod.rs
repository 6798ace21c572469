//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound call scope (owned by the proxy engine)
//!     → child scope per routing decision (cancel.rs)
//!     → outbound work observes child.cancelled()
//!     → child cancelled when the decision is dropped or the parent is cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation flows parent → child only
//! - Every derived scope is paired with a guard so it is always released

pub mod cancel;

pub use cancel::{CancelGuard, CancelScope};
