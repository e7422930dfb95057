use kindling_core::KindlingError;
use thiserror::Error;

/// Error type for coordination-service discovery
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Cannot connect to coordination service at '{connect_string}': {message}")]
    Connection {
        connect_string: String,
        message: String,
    },

    #[error("Service lookup failed for '{service_id}': {message}")]
    ServiceLookup {
        service_id: String,
        message: String,
    },

    #[error("Registration failed for instance '{instance_id}': {message}")]
    Registration {
        instance_id: String,
        message: String,
    },
}

impl DiscoveryError {
    /// Create a new connection error
    pub fn connection(connect_string: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            connect_string: connect_string.into(),
            message: message.into(),
        }
    }

    /// Create a new service-lookup error
    pub fn service_lookup(service_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceLookup {
            service_id: service_id.into(),
            message: message.into(),
        }
    }

    /// Create a new registration error
    pub fn registration(instance_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            instance_id: instance_id.into(),
            message: message.into(),
        }
    }

    /// Check if the error is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl From<DiscoveryError> for KindlingError {
    fn from(error: DiscoveryError) -> Self {
        KindlingError::bootstrap("config-discovery", Box::new(error))
    }
}
