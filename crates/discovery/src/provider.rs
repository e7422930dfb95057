use crate::client::DiscoveryClient;
use crate::error::DiscoveryError;
use crate::instance::ServiceInstance;
use async_trait::async_trait;
use std::sync::Arc;

/// Capability resolving a logical service id to its instances
///
/// Consumed by the config-fetching collaborator to locate the config server
/// before the full application context exists.
#[async_trait]
pub trait ConfigServerInstances: Send + Sync {
    async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError>;
}

#[async_trait]
impl ConfigServerInstances for DiscoveryClient {
    async fn instances(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        DiscoveryClient::instances(self, service_id).await
    }
}

/// Instance-provider function bound to a discovery client
///
/// The registry/context key for "how do I find the config server". Binding
/// shares the client `Arc` rather than creating a second session.
pub struct InstanceProviderFn {
    inner: Arc<dyn ConfigServerInstances>,
}

impl InstanceProviderFn {
    /// Bind the provider to an existing discovery client
    pub fn bound_to(client: Arc<DiscoveryClient>) -> Self {
        Self { inner: client }
    }

    /// Wrap an arbitrary instance source
    pub fn new(inner: Arc<dyn ConfigServerInstances>) -> Self {
        Self { inner }
    }

    /// Resolve the instances of a logical service
    pub async fn resolve(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        self.inner.instances(service_id).await
    }
}

impl std::fmt::Debug for InstanceProviderFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InstanceProviderFn").field(&"<fn>").finish()
    }
}
