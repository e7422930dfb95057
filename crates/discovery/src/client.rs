use crate::coordinator::Coordinator;
use crate::error::DiscoveryError;
use crate::instance::ServiceInstance;
use std::sync::Arc;

/// Discovery client over an established coordinator session
///
/// One client wraps one session. During a config-discovery bootstrap the
/// same `Arc<DiscoveryClient>` is placed in the bootstrap registry, bound
/// into the instance-provider function and later handed off to the
/// application context, so every handle observes the same session.
pub struct DiscoveryClient {
    coordinator: Arc<dyn Coordinator>,
}

impl DiscoveryClient {
    /// Wrap an established coordinator session
    pub fn new(coordinator: Arc<dyn Coordinator>) -> Self {
        Self { coordinator }
    }

    /// The connect string of the underlying session
    pub fn connect_string(&self) -> &str {
        self.coordinator.connect_string()
    }

    /// All known logical service names
    pub async fn services(&self) -> Result<Vec<String>, DiscoveryError> {
        self.coordinator.services().await
    }

    /// All registered instances of a logical service
    pub async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        tracing::debug!("Looking up instances of '{}'", service_id);
        self.coordinator.instances_of(service_id).await
    }

    pub(crate) fn coordinator(&self) -> &Arc<dyn Coordinator> {
        &self.coordinator
    }
}

impl std::fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("connect_string", &self.coordinator.connect_string())
            .finish()
    }
}
