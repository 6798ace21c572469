//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound call (full method name)
//!     → router.rs (exact lookup in RouteTable)
//!     → Return: matched Route or None (caller rejects as Unimplemented)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → RouteTable (HashMap keyed by method)
//!     → Frozen, shared by the Director
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact method match only; gRPC method names are not hierarchical paths
//! - Explicit miss rather than a silent default route

pub mod router;

pub use router::{Route, RouteTable};
