//! Route lookup.
//!
//! # Responsibilities
//! - Store the forwarded methods
//! - Look up the route for a full method name
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap
//! - Every route forwards to the director's single backend

use std::collections::HashMap;

use crate::config::{RouteConfig, OTLP_TRACE_EXPORT};

/// A forwarded method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Route identifier for logging/metrics.
    pub name: String,
    /// Full method name, e.g. "/pkg.Service/Method".
    pub method: String,
}

/// Immutable mapping from method name to route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Build a table. A later route with the same method replaces an earlier one.
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|route| (route.method.clone(), route))
                .collect(),
        }
    }

    /// The table forwarding only the OTLP trace export call.
    pub fn otlp_traces() -> Self {
        Self::new([Route {
            name: "otlp-traces".to_string(),
            method: OTLP_TRACE_EXPORT.to_string(),
        }])
    }

    /// Build from configuration.
    pub fn from_config(configs: &[RouteConfig]) -> Self {
        Self::new(configs.iter().map(|config| Route {
            name: config.name.clone(),
            method: config.method.clone(),
        }))
    }

    /// Find the route for a full method name.
    pub fn lookup(&self, method: &str) -> Option<&Route> {
        self.routes.get(method)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes sorted by method, for display.
    pub fn routes(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_by(|a, b| a.method.cmp(&b.method));
        routes
    }
}
