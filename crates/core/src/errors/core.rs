use thiserror::Error;

/// Core error type for the kindling bootstrap framework
///
/// Every failure during the bootstrap phase is fatal to startup: there is no
/// retry layer here. Errors surface synchronously to the caller of the
/// operation that produced them.
#[derive(Debug, Error)]
pub enum KindlingError {
    #[error("Duplicate registry key: {key} (registry entries are write-once)")]
    DuplicateKey { key: String },

    #[error("Registry is frozen, cannot put key: {key}")]
    RegistryFrozen { key: String },

    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Bootstrap failed during '{phase}': {source}")]
    Bootstrap {
        phase: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl KindlingError {
    /// Create a new duplicate-key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Create a new frozen-registry error
    pub fn registry_frozen(key: impl Into<String>) -> Self {
        Self::RegistryFrozen { key: key.into() }
    }

    /// Create a new service-not-found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new bootstrap error wrapping a collaborator failure
    pub fn bootstrap(
        phase: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Bootstrap {
            phase: phase.into(),
            source,
        }
    }

    /// Check if the error is a duplicate-key error
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Check if the error is a frozen-registry error
    pub fn is_registry_frozen(&self) -> bool {
        matches!(self, Self::RegistryFrozen { .. })
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the error originated in a bootstrap collaborator
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }
}

impl From<crate::config::ConfigError> for KindlingError {
    fn from(error: crate::config::ConfigError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}
