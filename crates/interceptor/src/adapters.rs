//! Trait boundaries for the collaborators this crate does not implement:
//! the packet-filter installer and the mesh registry client. Each ships an
//! in-memory or no-op implementation here, used by tests; a real
//! deployment binds its own implementation against whatever packet
//! processor and registry transport are actually available.

use crate::error::AdmissionError;
use async_trait::async_trait;
use compiler::PacketFilterRule;
use std::collections::HashMap;
use std::sync::Mutex;

/// Installs a compiled rule list on the external packet processor.
///
/// The real implementation is out of scope: the [`compiler`] crate's
/// output contract (an ordered [`PacketFilterRule`] list) is what an
/// implementer binds their packet-processor client against.
#[async_trait]
pub trait PacketFilterInstaller: Send + Sync {
    /// Install `rules`, replacing whatever was previously installed.
    async fn install(&self, rules: &[PacketFilterRule]) -> Result<(), AdmissionError>;
}

/// Records installed rule lists in memory; used by tests to assert what
/// the Interceptor would have installed.
#[derive(Default)]
pub struct InMemoryInstaller {
    installs: Mutex<Vec<Vec<PacketFilterRule>>>,
}

impl InMemoryInstaller {
    /// Construct an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule lists installed so far, in install order.
    #[must_use]
    pub fn installs(&self) -> Vec<Vec<PacketFilterRule>> {
        self.installs.lock().expect("installer lock poisoned").clone()
    }
}

#[async_trait]
impl PacketFilterInstaller for InMemoryInstaller {
    async fn install(&self, rules: &[PacketFilterRule]) -> Result<(), AdmissionError> {
        self.installs.lock().expect("installer lock poisoned").push(rules.to_vec());
        Ok(())
    }
}

/// Discards whatever is installed; the default when no installer is wired.
#[derive(Default)]
pub struct NoopInstaller;

#[async_trait]
impl PacketFilterInstaller for NoopInstaller {
    async fn install(&self, _rules: &[PacketFilterRule]) -> Result<(), AdmissionError> {
        Ok(())
    }
}

/// The mesh registry record this endpoint registers on startup and
/// unregisters on shutdown.
#[derive(Debug, Clone)]
pub struct RegistrationInfo {
    /// Endpoint identity string.
    pub name: String,
    /// Service names this endpoint serves.
    pub service_names: Vec<String>,
    /// This endpoint's own listen URL.
    pub listen_url: String,
    /// Arbitrary registry labels.
    pub labels: HashMap<String, String>,
}

/// The mesh registry client this endpoint registers against.
///
/// Re-registration must be idempotent; that contract is the real
/// implementation's responsibility, not this trait's.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Register (or re-register) this endpoint.
    async fn register(&self, info: &RegistrationInfo) -> Result<(), AdmissionError>;
    /// Unregister this endpoint by name.
    async fn unregister(&self, name: &str) -> Result<(), AdmissionError>;
}

/// A registry client that does nothing; used where registration is wired
/// externally or in tests that don't exercise it.
#[derive(Default)]
pub struct NoopRegistryClient;

#[async_trait]
impl RegistryClient for NoopRegistryClient {
    async fn register(&self, _info: &RegistrationInfo) -> Result<(), AdmissionError> {
        Ok(())
    }
    async fn unregister(&self, _name: &str) -> Result<(), AdmissionError> {
        Ok(())
    }
}
