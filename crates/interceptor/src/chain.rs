//! The admission chain: a capability set `{request, close}` every
//! middleware element implements, composed by passing each element a
//! `Next` handle to the remaining chain. No inheritance is required — a
//! plain ordered list plus slicing gives the same composition the original
//! dynamic-dispatch server chain provided.

use crate::error::AdmissionError;
use crate::request::{Connection, ConnectionRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One element of the admission chain (the Interceptor, or a stand-in for
/// a mechanism/cross-connect element that exists only to prove the chain
/// composes).
#[async_trait]
pub trait ChainElement: Send + Sync {
    /// Handle an admission request, forwarding to `next` as needed.
    async fn request(
        &self,
        req: ConnectionRequest,
        next: &Next<'_>,
        cancel: &CancellationToken,
    ) -> Result<ConnectionRequest, AdmissionError>;

    /// Handle connection teardown, forwarding to `next` as needed.
    async fn close(&self, conn: Connection, next: &Next<'_>) -> Result<(), AdmissionError>;
}

/// A handle to the remaining chain, held by the element currently running.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn ChainElement>],
}

impl<'a> Next<'a> {
    /// Forward a request to the next element, or return it unmodified if
    /// this was the last element.
    pub async fn request(
        &self,
        req: ConnectionRequest,
        cancel: &CancellationToken,
    ) -> Result<ConnectionRequest, AdmissionError> {
        match self.remaining.split_first() {
            Some((head, rest)) => head.request(req, &Next { remaining: rest }, cancel).await,
            None => Ok(req),
        }
    }

    /// Forward connection teardown to the next element, or no-op if this
    /// was the last element.
    pub async fn close(&self, conn: Connection) -> Result<(), AdmissionError> {
        match self.remaining.split_first() {
            Some((head, rest)) => head.close(conn, &Next { remaining: rest }).await,
            None => Ok(()),
        }
    }
}

/// An ordered admission chain: the Interceptor followed by whatever
/// mechanism-specific elements are wired in after it.
pub struct Chain {
    elements: Vec<Arc<dyn ChainElement>>,
}

impl Chain {
    /// Build a chain from its elements, in traversal order.
    #[must_use]
    pub fn new(elements: Vec<Arc<dyn ChainElement>>) -> Self {
        Self { elements }
    }

    /// Run a request through the whole chain from the front, uncancellable.
    pub async fn request(&self, req: ConnectionRequest) -> Result<ConnectionRequest, AdmissionError> {
        self.request_with_cancellation(req, &CancellationToken::new()).await
    }

    /// Run a request through the whole chain from the front, observing
    /// `cancel`. If `cancel` is already triggered, the chain never runs and
    /// returns [`AdmissionError::Cancelled`].
    pub async fn request_with_cancellation(
        &self,
        req: ConnectionRequest,
        cancel: &CancellationToken,
    ) -> Result<ConnectionRequest, AdmissionError> {
        if cancel.is_cancelled() {
            return Err(AdmissionError::Cancelled);
        }
        Next { remaining: &self.elements }.request(req, cancel).await
    }

    /// Run connection teardown through the whole chain from the front.
    pub async fn close(&self, conn: Connection) -> Result<(), AdmissionError> {
        Next { remaining: &self.elements }.close(conn).await
    }
}
