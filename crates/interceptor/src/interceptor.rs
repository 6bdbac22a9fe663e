//! The Interceptor: the admission middleware element that invokes the
//! policy matcher and shapes the response.

use crate::adapters::PacketFilterInstaller;
use crate::chain::{ChainElement, Next};
use crate::error::AdmissionError;
use crate::request::{extract_source_ip, Connection, ConnectionRequest};
use async_trait::async_trait;
use policy::{Matcher, Policy};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Gates every admission request: extracts the source IP, consults the
/// matcher, and either denies with a typed error or installs the current
/// policy's compiled rules (if they have changed since the last install)
/// and forwards to the rest of the chain.
///
/// Rule recompilation happens only when the policy snapshot has changed
/// since the last install — not on every admitted connection — so the
/// admission hot path stays free of compiler work even though the pipeline
/// reads, at a glance, as "compile on every admit".
pub struct Interceptor {
    matcher: Arc<Matcher>,
    installer: Arc<dyn PacketFilterInstaller>,
    last_installed: Mutex<Option<Arc<Policy>>>,
}

impl Interceptor {
    /// Construct an interceptor bound to a matcher and an installer
    /// adapter.
    #[must_use]
    pub fn new(matcher: Arc<Matcher>, installer: Arc<dyn PacketFilterInstaller>) -> Self {
        Self { matcher, installer, last_installed: Mutex::new(None) }
    }

    /// The matcher this interceptor consults.
    #[must_use]
    pub fn matcher(&self) -> &Arc<Matcher> {
        &self.matcher
    }

    async fn ensure_rules_installed(&self) -> Result<(), AdmissionError> {
        let current = self.matcher.current_policy();
        let mut last = self.last_installed.lock().await;
        let changed = match last.as_ref() {
            Some(prev) => !Arc::ptr_eq(prev, &current),
            None => true,
        };
        if changed {
            let rules = compiler::compile(&current)
                .map_err(|e| AdmissionError::Internal(e.to_string()))?;
            self.installer.install(&rules).await?;
            *last = Some(current);
        }
        Ok(())
    }
}

#[async_trait]
impl ChainElement for Interceptor {
    async fn request(
        &self,
        req: ConnectionRequest,
        next: &Next<'_>,
        cancel: &CancellationToken,
    ) -> Result<ConnectionRequest, AdmissionError> {
        if cancel.is_cancelled() {
            return Err(AdmissionError::Cancelled);
        }

        let ip = extract_source_ip(&req)?;

        let timer = ipfilter_core::time::start();
        let (admit, reason) = self.matcher.is_allowed(ip);
        let latency_ns = timer.stop();

        if admit {
            info!(ip = %ip, admit, reason = %reason, latency_ns, "admission decision");
        } else {
            warn!(ip = %ip, admit, reason = %reason, latency_ns, "admission decision");
        }

        if !admit {
            return Err(AdmissionError::PermissionDenied(format!(
                "IP {ip} is not allowed: {reason}"
            )));
        }

        self.ensure_rules_installed().await?;

        if cancel.is_cancelled() {
            return Err(AdmissionError::Cancelled);
        }

        next.request(req, cancel).await.map_err(|e| AdmissionError::DownstreamFailure(Box::new(e)))
    }

    async fn close(&self, conn: Connection, next: &Next<'_>) -> Result<(), AdmissionError> {
        // Transparent on teardown: admission was decided at open, so
        // closing a connection that was never forwarded is a no-op.
        next.close(conn).await.map_err(|e| AdmissionError::DownstreamFailure(Box::new(e)))
    }
}
