//! Stream director for a gRPC reverse proxy.
//!
//! Decides, once per inbound call, whether and where to forward it, and
//! lazily establishes the single shared connection to the backend.

pub mod config;
pub mod director;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::DirectorConfig;
pub use director::{
    CallContext, Director, DirectorError, DirectorOptions, OutboundContext, RoutingDecision,
    StreamDirector,
};
pub use lifecycle::CancelScope;
