pub mod flags;
pub mod sources;
pub mod validation;

pub use flags::{
    BootstrapConfig, FeatureFlag, AUTO_REGISTRATION_ENABLED, CONFIG_DISCOVERY_ENABLED,
    COORDINATION_CONNECT_STRING,
};
pub use sources::ConfigSource;
pub use validation::ConfigError;
