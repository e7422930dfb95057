pub mod bootstrap;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod instance;
pub mod provider;
pub mod registration;
pub mod testing;

// Re-export key types for convenience
pub use bootstrap::ConfigDiscoveryBootstrapper;
pub use client::DiscoveryClient;
pub use coordinator::{Coordinator, CoordinatorConnector};
pub use error::DiscoveryError;
pub use instance::ServiceInstance;
pub use provider::{ConfigServerInstances, InstanceProviderFn};
pub use registration::AutoServiceRegistration;
