//! Stream director.
//!
//! # Data Flow
//! ```text
//! Proxy engine, once per inbound call, before relaying any frame:
//!     direct(call, method)
//!     → context.rs (metadata present? derive outbound copy + child scope)
//!     → routing (method in RouteTable?)
//!         no  → UnrecognizedMethod (Unimplemented)
//!         yes → connection.rs (shared channel, dialed on first use)
//!     → RoutingDecision { context, route, channel } or DirectorError
//! ```
//!
//! # Design Decisions
//! - Construction has no side effects; the backend is dialed by the first routed call
//! - Connection state is owned by the Director, not captured ambient state
//! - Dropping a decision (or an error path) always releases the outbound scope
//! - Diagnostics go to the sink given in `DirectorOptions`, silent by default

pub mod codec;
pub mod connection;
pub mod context;
pub mod dial;
pub mod error;

use std::future::Future;
use std::time::Duration;

use tonic::transport::Channel;

use crate::config::DirectorConfig;
use crate::observability::{metrics, DiagnosticSink};
use crate::resilience::retries::DialRetryPolicy;
use crate::routing::{Route, RouteTable};

pub use codec::{forward_unary, PassthroughCodec};
pub use connection::LazyConnection;
pub use context::{CallContext, OutboundContext};
pub use dial::{BackendTarget, Dial, DialError, TlsSettings, TonicDialer};
pub use error::DirectorError;

/// The per-call decision contract consumed by a proxy engine.
pub trait StreamDirector: Send + Sync {
    /// Decide where `method` goes. Called before any payload is relayed.
    fn direct(
        &self,
        call: &CallContext,
        method: &str,
    ) -> impl Future<Output = Result<RoutingDecision, DirectorError>> + Send;
}

/// Where to forward a call.
#[derive(Debug)]
pub struct RoutingDecision {
    /// Outbound context: metadata copy and child cancellation scope.
    pub context: OutboundContext,
    /// The matched route.
    pub route: Route,
    /// Shared channel to the backend.
    pub channel: Channel,
}

/// Options recognized by [`Director::new`].
#[derive(Debug, Clone)]
pub struct DirectorOptions {
    logger: DiagnosticSink,
    connect_timeout: Duration,
    tls: Option<TlsSettings>,
    retry: DialRetryPolicy,
    routes: RouteTable,
}

impl DirectorOptions {
    pub fn new() -> Self {
        Self {
            logger: DiagnosticSink::noop(),
            connect_timeout: Duration::from_secs(5),
            tls: None,
            retry: DialRetryPolicy::default(),
            routes: RouteTable::otlp_traces(),
        }
    }

    /// Send diagnostic events to `logger`.
    pub fn with_logger(mut self, logger: impl Into<DiagnosticSink>) -> Self {
        self.logger = logger.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Dial the backend over TLS instead of plaintext.
    pub fn with_tls(mut self, tls: TlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_retry_policy(mut self, policy: DialRetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }
}

impl Default for DirectorOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes inbound calls to a single lazily connected backend.
#[derive(Debug)]
pub struct Director<D = TonicDialer> {
    routes: RouteTable,
    connection: LazyConnection<D>,
    sink: DiagnosticSink,
}

impl Director<TonicDialer> {
    /// Create a director for `target`. Nothing is dialed until the first routed call.
    pub fn new(target: impl Into<BackendTarget>, options: DirectorOptions) -> Self {
        let mut dialer = TonicDialer::new(options.connect_timeout);
        if let Some(tls) = options.tls.clone() {
            dialer = dialer.with_tls(tls);
        }
        Self::with_dialer(target, options, dialer)
    }

    /// Create a director from configuration. Reads the TLS CA bundle if one is configured.
    pub fn from_config(config: &DirectorConfig, logger: DiagnosticSink) -> Result<Self, DialError> {
        let mut options = DirectorOptions::new()
            .with_logger(logger)
            .with_connect_timeout(Duration::from_millis(config.backend.connect_timeout_ms))
            .with_retry_policy(DialRetryPolicy::from(&config.retries))
            .with_routes(RouteTable::from_config(&config.routes));
        if let Some(tls) = &config.backend.tls {
            options = options.with_tls(TlsSettings::from_config(tls)?);
        }
        Ok(Self::new(config.backend.target.as_str(), options))
    }
}

impl<D: Dial> Director<D> {
    /// Create a director that dials through `dialer`.
    pub fn with_dialer(target: impl Into<BackendTarget>, options: DirectorOptions, dialer: D) -> Self {
        Self {
            routes: options.routes,
            connection: LazyConnection::new(
                target.into(),
                dialer,
                options.connect_timeout,
                options.retry,
            ),
            sink: options.logger,
        }
    }

    pub fn target(&self) -> &BackendTarget {
        self.connection.target()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// True once the backend connection has been established.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Decide whether and where to forward `method`.
    pub async fn direct(
        &self,
        call: &CallContext,
        method: &str,
    ) -> Result<RoutingDecision, DirectorError> {
        let Some(metadata) = call.metadata() else {
            let error = DirectorError::MetadataUnavailable;
            metrics::record_decision(error.outcome());
            return Err(error);
        };

        let context = OutboundContext::derive(call, metadata);

        let Some(route) = self.routes.lookup(method) else {
            self.sink.emit(|| {
                tracing::info!(
                    call_id = %call.call_id(),
                    method = %method,
                    "gRPC reverse proxy director caught unknown method"
                )
            });
            let error = DirectorError::UnrecognizedMethod {
                method: method.to_string(),
            };
            metrics::record_decision(error.outcome());
            return Err(error);
        };

        match self.connection.get(call, &self.sink).await {
            Ok(channel) => {
                metrics::record_decision("forwarded");
                Ok(RoutingDecision {
                    context,
                    route: route.clone(),
                    channel,
                })
            }
            Err(error) => {
                metrics::record_decision(error.outcome());
                Err(error)
            }
        }
    }
}

impl<D: Dial> StreamDirector for Director<D> {
    fn direct(
        &self,
        call: &CallContext,
        method: &str,
    ) -> impl Future<Output = Result<RoutingDecision, DirectorError>> + Send {
        Director::direct(self, call, method)
    }
}
