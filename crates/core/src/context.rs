use crate::errors::KindlingError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Long-lived application container receiving bootstrap handoffs
///
/// Holds singletons keyed by type. The bootstrap handoff adopts entries by
/// moving the shared `Arc` across, so a value resolved here after startup is
/// the same allocation that sat in the bootstrap registry at close time.
#[derive(Debug, Default)]
pub struct ApplicationContext {
    services: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ApplicationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a singleton by type
    pub fn resolve<T>(&self) -> Result<Arc<T>, KindlingError>
    where
        T: Send + Sync + 'static,
    {
        self.try_resolve::<T>()
            .ok_or_else(|| KindlingError::service_not_found(std::any::type_name::<T>()))
    }

    /// Try to resolve a singleton by type
    ///
    /// `None` is the ordinary result for a key that was never handed off,
    /// e.g. when the feature that would have registered it is disabled.
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let services = self.services.read().ok()?;
        services
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }

    /// Check whether a type is registered
    pub fn contains<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.services
            .read()
            .map(|services| services.contains_key(&TypeId::of::<T>()))
            .unwrap_or(false)
    }

    /// Number of adopted singletons
    pub fn service_count(&self) -> usize {
        self.services
            .read()
            .map(|services| services.len())
            .unwrap_or(0)
    }

    /// Adopt a bootstrap entry under its original type key
    ///
    /// Used only by the handoff step; the `Arc` is stored as-is so identity
    /// is preserved across the phase boundary.
    pub(crate) fn adopt(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), KindlingError> {
        let mut services = self.services.write().map_err(|_| KindlingError::LockError {
            resource: "application_context".to_string(),
        })?;
        services.insert(type_id, value);
        tracing::debug!("Application context adopted {}", type_name);
        Ok(())
    }
}
