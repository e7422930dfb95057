use crate::config::BootstrapConfig;
use crate::context::ApplicationContext;
use crate::errors::KindlingError;
use crate::registry::{BootstrapRegistry, CloseEvent};
use async_trait::async_trait;

/// A startup hook that may populate the bootstrap registry
///
/// Bootstrappers run in registration order, before the registry freezes.
/// Putting nothing is a legitimate outcome (a disabled feature); returning an
/// error aborts the whole phase.
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    /// Name used in logs and error phases
    fn name(&self) -> &str;

    /// Inspect configuration and optionally populate the registry
    async fn initialize(
        &self,
        config: &BootstrapConfig,
        registry: &mut BootstrapRegistry,
    ) -> Result<(), KindlingError>;
}

/// Summary of a completed bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Number of registry entries adopted by the application context
    pub entries_handed_off: usize,
    /// Number of bootstrappers that ran
    pub bootstrappers_run: usize,
}

/// Orchestrates the bootstrap phase
///
/// Runs to completion on one logical task before the main application phase
/// begins: evaluate bootstrappers, freeze the registry, emit the single close
/// event, then hand every entry off into the [`ApplicationContext`] with
/// `Arc` identity preserved. Any bootstrapper failure aborts the phase before
/// freeze, so no partial registry state ever reaches the context.
pub struct BootstrapPhase {
    config: BootstrapConfig,
    registry: BootstrapRegistry,
    bootstrappers: Vec<Box<dyn Bootstrapper>>,
}

impl BootstrapPhase {
    /// Create a phase over the given configuration
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            registry: BootstrapRegistry::new(),
            bootstrappers: Vec::new(),
        }
    }

    /// Register a bootstrapper; they run in registration order
    pub fn add_bootstrapper(mut self, bootstrapper: impl Bootstrapper + 'static) -> Self {
        self.bootstrappers.push(Box::new(bootstrapper));
        self
    }

    /// Register a close listener on the underlying registry
    pub fn add_close_listener<F>(mut self, listener: F) -> Self
    where
        F: FnOnce(&CloseEvent) + Send + 'static,
    {
        self.registry.add_close_listener(listener);
        self
    }

    /// The phase configuration
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run the phase to completion and hand off into `context`
    pub async fn run(mut self, context: &ApplicationContext) -> Result<BootstrapReport, KindlingError> {
        tracing::info!(
            "Starting bootstrap phase with {} bootstrapper(s)",
            self.bootstrappers.len()
        );

        for bootstrapper in &self.bootstrappers {
            tracing::info!("Running bootstrapper: {}", bootstrapper.name());
            bootstrapper
                .initialize(&self.config, &mut self.registry)
                .await
                .map_err(|error| {
                    tracing::error!("Bootstrapper '{}' failed: {}", bootstrapper.name(), error);
                    error
                })?;
        }

        // close() freezes the registry before firing the listeners
        let _event = self.registry.close();

        let entries = self.registry.entries_in_order();
        for (type_id, type_name, value) in &entries {
            context.adopt(*type_id, *type_name, value.clone())?;
        }

        tracing::info!(
            "Bootstrap phase complete: {} entr(ies) handed off",
            entries.len()
        );
        Ok(BootstrapReport {
            entries_handed_off: entries.len(),
            bootstrappers_run: self.bootstrappers.len(),
        })
    }
}
