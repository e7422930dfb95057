use crate::client::DiscoveryClient;
use crate::error::DiscoveryError;
use crate::instance::ServiceInstance;
use kindling_core::FeatureFlag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Registers the local service instance with the coordination service
///
/// Gated on the auto-registration flag: when disabled, `start` is a no-op.
/// `stop` deregisters only what `start` actually registered.
pub struct AutoServiceRegistration {
    client: Arc<DiscoveryClient>,
    instance: ServiceInstance,
    enabled: bool,
    registered: AtomicBool,
}

impl AutoServiceRegistration {
    /// Bind auto-registration to a client, a local instance and the resolved flag
    pub fn new(client: Arc<DiscoveryClient>, instance: ServiceInstance, flag: &FeatureFlag) -> Self {
        Self {
            client,
            instance,
            enabled: flag.is_enabled(),
            registered: AtomicBool::new(false),
        }
    }

    /// Whether the local instance is currently registered
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Register the local instance if the flag allows it
    ///
    /// Returns whether a registration actually happened.
    pub async fn start(&self) -> Result<bool, DiscoveryError> {
        if !self.enabled {
            tracing::info!(
                "Auto-registration disabled, not registering '{}'",
                self.instance.service_id
            );
            return Ok(false);
        }
        if self.registered.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        match self.client.coordinator().register(self.instance.clone()).await {
            Ok(()) => {
                tracing::info!(
                    "Registered '{}' at {}",
                    self.instance.service_id,
                    self.instance.uri()
                );
                Ok(true)
            }
            Err(error) => {
                self.registered.store(false, Ordering::SeqCst);
                Err(error)
            }
        }
    }

    /// Deregister the local instance if it was registered
    pub async fn stop(&self) -> Result<(), DiscoveryError> {
        if !self.registered.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.coordinator().deregister(self.instance.id).await?;
        tracing::info!("Deregistered '{}'", self.instance.service_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorConnector;
    use crate::testing::TestingCoordinator;

    async fn client_for(server: &TestingCoordinator) -> Arc<DiscoveryClient> {
        let session = server
            .connector()
            .connect(server.connect_string())
            .await
            .unwrap();
        Arc::new(DiscoveryClient::new(session))
    }

    #[tokio::test]
    async fn start_registers_and_stop_deregisters_when_enabled() {
        let server = TestingCoordinator::start();
        let client = client_for(&server).await;
        let instance = ServiceInstance::new("billing", "localhost", 9000);
        let flag = FeatureFlag::new("service-registry.auto-registration.enabled", true);

        let registration = AutoServiceRegistration::new(client.clone(), instance, &flag);
        assert!(registration.start().await.unwrap());
        assert!(registration.is_registered());
        assert_eq!(client.instances("billing").await.unwrap().len(), 1);

        // Second start is a no-op, not a duplicate registration
        assert!(!registration.start().await.unwrap());
        assert_eq!(client.instances("billing").await.unwrap().len(), 1);

        registration.stop().await.unwrap();
        assert!(!registration.is_registered());
        assert!(client.instances("billing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_flag_makes_start_a_no_op() {
        let server = TestingCoordinator::start();
        let client = client_for(&server).await;
        let instance = ServiceInstance::new("billing", "localhost", 9000);
        let flag = FeatureFlag::new("service-registry.auto-registration.enabled", false);

        let registration = AutoServiceRegistration::new(client.clone(), instance, &flag);
        assert!(!registration.start().await.unwrap());
        assert!(!registration.is_registered());
        assert!(client.instances("billing").await.unwrap().is_empty());

        // stop with nothing registered is also a no-op
        registration.stop().await.unwrap();
    }

    #[tokio::test]
    async fn failed_registration_leaves_state_unregistered() {
        let server = TestingCoordinator::start();
        let client = client_for(&server).await;
        let instance = ServiceInstance::new("billing", "localhost", 9000);
        let flag = FeatureFlag::new("service-registry.auto-registration.enabled", true);

        server.stop();
        let registration = AutoServiceRegistration::new(client, instance, &flag);
        assert!(registration.start().await.unwrap_err().is_connection());
        assert!(!registration.is_registered());
    }
}
