pub mod config;
pub mod context;
pub mod errors;
pub mod registry;
pub mod runner;

// Re-export key types for convenience
pub use config::{BootstrapConfig, ConfigError, ConfigSource, FeatureFlag};
pub use config::{AUTO_REGISTRATION_ENABLED, CONFIG_DISCOVERY_ENABLED, COORDINATION_CONNECT_STRING};
pub use context::ApplicationContext;
pub use errors::KindlingError;
pub use registry::{BootstrapRegistry, CloseEvent, RegistrySnapshot, RegistryState};
pub use runner::{BootstrapPhase, BootstrapReport, Bootstrapper};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}
