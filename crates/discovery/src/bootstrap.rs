use crate::client::DiscoveryClient;
use crate::coordinator::CoordinatorConnector;
use crate::instance::ServiceInstance;
use crate::provider::InstanceProviderFn;
use crate::registration::AutoServiceRegistration;
use async_trait::async_trait;
use kindling_core::registry::BootstrapRegistry;
use kindling_core::runner::Bootstrapper;
use kindling_core::{
    BootstrapConfig, KindlingError, AUTO_REGISTRATION_ENABLED, CONFIG_DISCOVERY_ENABLED,
    COORDINATION_CONNECT_STRING,
};
use std::sync::Arc;

/// Conditionally registers config-discovery services during bootstrap
///
/// With `config.discovery.enabled` off (the default) nothing is put into the
/// registry for either key; their absence is the observable outcome, not an
/// error. With the flag on, one coordinator session is established and a
/// [`DiscoveryClient`] plus an [`InstanceProviderFn`] bound to that same
/// client are registered. A connection failure aborts the whole phase.
///
/// When a local instance is configured, an [`AutoServiceRegistration`] gated
/// on `service-registry.auto-registration.enabled` is registered as well,
/// bound to the same client session.
pub struct ConfigDiscoveryBootstrapper {
    connector: Arc<dyn CoordinatorConnector>,
    local_instance: Option<ServiceInstance>,
}

impl ConfigDiscoveryBootstrapper {
    /// Create the bootstrapper over a coordinator connector
    pub fn new(connector: Arc<dyn CoordinatorConnector>) -> Self {
        Self {
            connector,
            local_instance: None,
        }
    }

    /// Configure the local instance that auto-registration should announce
    pub fn with_local_instance(mut self, instance: ServiceInstance) -> Self {
        self.local_instance = Some(instance);
        self
    }
}

#[async_trait]
impl Bootstrapper for ConfigDiscoveryBootstrapper {
    fn name(&self) -> &str {
        "config-discovery"
    }

    async fn initialize(
        &self,
        config: &BootstrapConfig,
        registry: &mut BootstrapRegistry,
    ) -> Result<(), KindlingError> {
        // Resolve both flags up front so malformed values fail the phase
        // even when discovery stays off.
        let discovery = config.flag(CONFIG_DISCOVERY_ENABLED, false)?;
        let auto_registration = config.flag(AUTO_REGISTRATION_ENABLED, true)?;
        tracing::debug!(
            "Flags resolved: {}={}, {}={}",
            discovery.name(),
            discovery.is_enabled(),
            auto_registration.name(),
            auto_registration.is_enabled()
        );

        if !discovery.is_enabled() {
            tracing::info!("Config discovery disabled, skipping registration");
            return Ok(());
        }

        let connect_string = config.get_required(
            COORDINATION_CONNECT_STRING,
            "set the host:port of the coordination service",
        )?;

        tracing::info!("Connecting to coordination service at {}", connect_string);
        let coordinator = self
            .connector
            .connect(&connect_string)
            .await
            .map_err(KindlingError::from)?;

        let client = Arc::new(DiscoveryClient::new(coordinator));
        registry.put(client.clone())?;
        registry.put(Arc::new(InstanceProviderFn::bound_to(client.clone())))?;
        tracing::info!("Registered discovery client and config-server instance provider");

        if let Some(instance) = &self.local_instance {
            let registration =
                AutoServiceRegistration::new(client, instance.clone(), &auto_registration);
            registry.put(Arc::new(registration))?;
            tracing::info!(
                "Registered auto-registration for '{}' (enabled: {})",
                instance.service_id,
                auto_registration.is_enabled()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestingCoordinator;

    #[tokio::test]
    async fn malformed_flag_fails_even_when_discovery_would_stay_off() {
        let server = TestingCoordinator::start();
        let bootstrapper = ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()));

        let config = BootstrapConfig::new().with(CONFIG_DISCOVERY_ENABLED, "maybe");
        let mut registry = BootstrapRegistry::new();

        let err = bootstrapper
            .initialize(&config, &mut registry)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn missing_connect_string_is_a_configuration_error() {
        let server = TestingCoordinator::start();
        let bootstrapper = ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()));

        let config = BootstrapConfig::new().with(CONFIG_DISCOVERY_ENABLED, "true");
        let mut registry = BootstrapRegistry::new();

        let err = bootstrapper
            .initialize(&config, &mut registry)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn provider_is_bound_to_the_registered_client() {
        let server = TestingCoordinator::start();
        let bootstrapper = ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()));

        let config = BootstrapConfig::new()
            .with(CONFIG_DISCOVERY_ENABLED, "true")
            .with(COORDINATION_CONNECT_STRING, server.connect_string());
        let mut registry = BootstrapRegistry::new();

        bootstrapper.initialize(&config, &mut registry).await.unwrap();

        let client = registry.get::<DiscoveryClient>().unwrap();
        let provider = registry.get::<InstanceProviderFn>().unwrap();
        assert_eq!(client.connect_string(), server.connect_string());

        // Both resolve through the same seeded server state.
        server
            .seed(ServiceInstance::new("config-server", "localhost", 8888))
            .await;
        assert_eq!(client.instances("config-server").await.unwrap().len(), 1);
        assert_eq!(provider.resolve("config-server").await.unwrap().len(), 1);

        // No local instance configured, so no auto-registration entry.
        assert!(!registry.contains::<AutoServiceRegistration>());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn local_instance_wires_auto_registration() {
        let server = TestingCoordinator::start();
        let bootstrapper = ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()))
            .with_local_instance(ServiceInstance::new("billing", "localhost", 9000));

        let config = BootstrapConfig::new()
            .with(CONFIG_DISCOVERY_ENABLED, "true")
            .with(COORDINATION_CONNECT_STRING, server.connect_string());
        let mut registry = BootstrapRegistry::new();
        bootstrapper.initialize(&config, &mut registry).await.unwrap();

        let registration = registry.get::<AutoServiceRegistration>().unwrap();
        assert!(registration.start().await.unwrap());

        // Announced through the same client session that was registered.
        let client = registry.get::<DiscoveryClient>().unwrap();
        assert_eq!(client.instances("billing").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disabled_auto_registration_flag_is_honored_from_bootstrap() {
        let server = TestingCoordinator::start();
        let bootstrapper = ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()))
            .with_local_instance(ServiceInstance::new("billing", "localhost", 9000));

        let config = BootstrapConfig::new()
            .with(CONFIG_DISCOVERY_ENABLED, "true")
            .with(AUTO_REGISTRATION_ENABLED, "false")
            .with(COORDINATION_CONNECT_STRING, server.connect_string());
        let mut registry = BootstrapRegistry::new();
        bootstrapper.initialize(&config, &mut registry).await.unwrap();

        let registration = registry.get::<AutoServiceRegistration>().unwrap();
        assert!(!registration.start().await.unwrap());

        let client = registry.get::<DiscoveryClient>().unwrap();
        assert!(client.instances("billing").await.unwrap().is_empty());
    }
}
