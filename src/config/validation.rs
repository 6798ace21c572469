//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, delays ordered)
//! - Detect malformed and duplicate route methods
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DirectorConfig → Result<(), Vec<ValidationError>>
//! - The backend target is only checked for presence; reachability is a dial concern

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DirectorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend target must not be empty")]
    EmptyBackendTarget,

    #[error("backend connect timeout must be greater than zero")]
    ZeroConnectTimeout,

    #[error("at least one route is required")]
    NoRoutes,

    #[error("route '{name}' has malformed method '{method}' (expected /package.Service/Method)")]
    MalformedMethod { name: String, method: String },

    #[error("method '{method}' is routed more than once")]
    DuplicateMethod { method: String },

    #[error("retries.max_attempts must be at least 1")]
    ZeroRetryAttempts,

    #[error("retries.base_delay_ms ({base_ms}) exceeds retries.max_delay_ms ({max_ms})")]
    BackoffOrder { base_ms: u64, max_ms: u64 },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.target.trim().is_empty() {
        errors.push(ValidationError::EmptyBackendTarget);
    }
    if config.backend.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    let mut seen = HashSet::new();
    for route in &config.routes {
        if !is_method_name(&route.method) {
            errors.push(ValidationError::MalformedMethod {
                name: route.name.clone(),
                method: route.method.clone(),
            });
        }
        if !seen.insert(route.method.as_str()) {
            errors.push(ValidationError::DuplicateMethod {
                method: route.method.clone(),
            });
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroRetryAttempts);
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffOrder {
            base_ms: config.retries.base_delay_ms,
            max_ms: config.retries.max_delay_ms,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Returns true for names of the form "/package.Service/Method".
pub fn is_method_name(method: &str) -> bool {
    let Some(rest) = method.strip_prefix('/') else {
        return false;
    };
    match rest.split_once('/') {
        Some((service, name)) => !service.is_empty() && !name.is_empty() && !name.contains('/'),
        None => false,
    }
}
