use crate::errors::KindlingError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry lifecycle state
///
/// `Open → Frozen` is terminal; there is no transition back to `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Open,
    Frozen,
}

/// Listener invoked exactly once over the frozen registry snapshot
pub type CloseListener = Box<dyn FnOnce(&CloseEvent) + Send>;

/// Short-lived, write-once-per-key store scoped to the bootstrap phase
///
/// Entries are keyed by their Rust type and held as shared `Arc`s; the
/// registry never clones or copies a value. A second `put` for the same type
/// is a [`KindlingError::DuplicateKey`], not a silent overwrite. Once
/// [`freeze`](BootstrapRegistry::freeze) runs the registry is read-only and
/// safe to share with any number of readers.
pub struct BootstrapRegistry {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    type_names: HashMap<TypeId, &'static str>,
    insertion_order: Vec<TypeId>,
    state: RegistryState,
    close_listeners: Vec<CloseListener>,
}

impl std::fmt::Debug for BootstrapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapRegistry")
            .field("entries", &self.insertion_order.len())
            .field("state", &self.state)
            .field("close_listeners", &self.close_listeners.len())
            .finish()
    }
}

impl BootstrapRegistry {
    /// Create a new, open registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            type_names: HashMap::new(),
            insertion_order: Vec::new(),
            state: RegistryState::Open,
            close_listeners: Vec::new(),
        }
    }

    /// Insert a new entry under its type key
    ///
    /// Fails with [`KindlingError::DuplicateKey`] when the key is already
    /// present (the first value is retained) and with
    /// [`KindlingError::RegistryFrozen`] after [`freeze`](Self::freeze).
    pub fn put<T>(&mut self, value: Arc<T>) -> Result<(), KindlingError>
    where
        T: Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        if self.state == RegistryState::Frozen {
            return Err(KindlingError::registry_frozen(key));
        }

        let type_id = TypeId::of::<T>();
        if self.entries.contains_key(&type_id) {
            return Err(KindlingError::duplicate_key(key));
        }

        self.entries.insert(type_id, value);
        self.type_names.insert(type_id, key);
        self.insertion_order.push(type_id);
        tracing::debug!("Bootstrap registry: registered {}", key);
        Ok(())
    }

    /// Look up an entry by type
    ///
    /// Absence is an ordinary outcome (`None`), never an error: callers must
    /// be able to distinguish "feature disabled, never registered" from a
    /// registered value.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }

    /// Check whether a type key is registered
    pub fn contains<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether the registry has been frozen
    pub fn is_frozen(&self) -> bool {
        self.state == RegistryState::Frozen
    }

    /// Transition to read-only. Idempotent; there is no way back to `Open`.
    pub fn freeze(&mut self) {
        if self.state == RegistryState::Open {
            self.state = RegistryState::Frozen;
            tracing::debug!(
                "Bootstrap registry frozen with {} entries",
                self.entries.len()
            );
        }
    }

    /// Register a close listener
    ///
    /// Listeners run exactly once, in registration order, when the close
    /// event is emitted over the frozen registry.
    pub fn add_close_listener<F>(&mut self, listener: F)
    where
        F: FnOnce(&CloseEvent) + Send + 'static,
    {
        self.close_listeners.push(Box::new(listener));
    }

    /// Freeze (if still open) and emit the single close event
    ///
    /// Drains and invokes every close listener in registration order. The
    /// returned event shares the frozen entries without copying them.
    pub fn close(&mut self) -> CloseEvent {
        self.freeze();
        let event = CloseEvent {
            snapshot: RegistrySnapshot {
                entries: Arc::new(self.entries.clone()),
            },
        };
        for listener in self.close_listeners.drain(..) {
            listener(&event);
        }
        event
    }

    /// Entries in insertion order, for the handoff step
    pub(crate) fn entries_in_order(&self) -> Vec<(TypeId, &'static str, Arc<dyn Any + Send + Sync>)> {
        self.insertion_order
            .iter()
            .map(|type_id| {
                (
                    *type_id,
                    self.type_names[type_id],
                    self.entries[type_id].clone(),
                )
            })
            .collect()
    }
}

impl Default for BootstrapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of the frozen registry shared by close listeners
#[derive(Clone)]
pub struct RegistrySnapshot {
    entries: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl RegistrySnapshot {
    /// Look up an entry by type; shares the registered `Arc`
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }

    /// Check whether a type key is present
    pub fn contains<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

/// The one-per-run event exposing the frozen registry to close listeners
pub struct CloseEvent {
    snapshot: RegistrySnapshot,
}

impl CloseEvent {
    /// The frozen registry snapshot
    pub fn registry(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    /// Convenience lookup on the snapshot
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.snapshot.get::<T>()
    }
}
