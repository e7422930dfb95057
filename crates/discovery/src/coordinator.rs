use crate::error::DiscoveryError;
use crate::instance::ServiceInstance;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Narrow interface over an external coordination service
///
/// The wire protocol lives entirely behind this trait; implementations may
/// block on I/O and enforce their own timeouts. The bootstrap layer performs
/// no retries of its own.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// The connect string this session was established against
    fn connect_string(&self) -> &str;

    /// All known logical service names
    async fn services(&self) -> Result<Vec<String>, DiscoveryError>;

    /// All registered instances of a logical service
    async fn instances_of(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError>;

    /// Register an instance
    async fn register(&self, instance: ServiceInstance) -> Result<(), DiscoveryError>;

    /// Deregister an instance by id
    async fn deregister(&self, instance_id: Uuid) -> Result<(), DiscoveryError>;
}

impl std::fmt::Debug for dyn Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("connect_string", &self.connect_string())
            .finish()
    }
}

/// Factory establishing coordinator sessions from a connect string
///
/// A failed `connect` during bootstrap is fatal to startup: the config
/// discovery bootstrapper propagates it and the phase aborts with no partial
/// handoff.
#[async_trait]
pub trait CoordinatorConnector: Send + Sync {
    async fn connect(&self, connect_string: &str) -> Result<Arc<dyn Coordinator>, DiscoveryError>;
}
