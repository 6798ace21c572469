//! Per-call contexts.
//!
//! # Responsibilities
//! - Carry the inbound metadata set and cancellation scope of one call
//! - Derive the outbound context: an owned metadata copy plus a child scope
//!
//! # Design Decisions
//! - The outbound metadata is a deep copy; edits never reach the inbound call
//! - The outbound scope is cancelled when the outbound context is dropped

use tonic::metadata::MetadataMap;
use uuid::Uuid;

use crate::lifecycle::{CancelGuard, CancelScope};

/// Inbound call data handed to the director.
#[derive(Debug, Clone)]
pub struct CallContext {
    call_id: Uuid,
    metadata: Option<MetadataMap>,
    scope: CancelScope,
}

impl CallContext {
    /// A call carrying `metadata`, in a fresh cancellation scope.
    pub fn new(metadata: MetadataMap) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            metadata: Some(metadata),
            scope: CancelScope::new(),
        }
    }

    /// A call with no metadata set attached.
    pub fn without_metadata() -> Self {
        Self {
            call_id: Uuid::new_v4(),
            metadata: None,
            scope: CancelScope::new(),
        }
    }

    /// A call whose metadata is the given HTTP/2 headers.
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        Self::new(MetadataMap::from_headers(headers.clone()))
    }

    /// A call built from a tonic request.
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        Self::new(request.metadata().clone())
    }

    /// Bind the call to the proxy engine's cancellation scope.
    pub fn with_scope(mut self, scope: CancelScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn metadata(&self) -> Option<&MetadataMap> {
        self.metadata.as_ref()
    }

    pub fn scope(&self) -> &CancelScope {
        &self.scope
    }
}

/// Context for the outbound call, derived from an inbound [`CallContext`].
#[derive(Debug)]
pub struct OutboundContext {
    call_id: Uuid,
    metadata: MetadataMap,
    guard: CancelGuard,
}

impl OutboundContext {
    pub(crate) fn derive(call: &CallContext, metadata: &MetadataMap) -> Self {
        Self {
            call_id: call.call_id(),
            metadata: metadata.clone(),
            guard: call.scope().child().guard(),
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataMap {
        &mut self.metadata
    }

    /// Scope of the outbound work. Cancelled with the inbound call or when this context drops.
    pub fn scope(&self) -> &CancelScope {
        self.guard.scope()
    }

    /// Wrap `message` in a request carrying the outbound metadata.
    pub fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        *request.metadata_mut() = self.metadata.clone();
        request
    }
}
