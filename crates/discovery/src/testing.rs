//! Embedded in-memory coordination service for tests
//!
//! The analog of the embedded test server the real coordination stacks ship:
//! `start()` yields a unique connect string, `stop()` severs it so further
//! connection attempts fail the way an unreachable server would.

use crate::coordinator::{Coordinator, CoordinatorConnector};
use crate::error::DiscoveryError;
use crate::instance::ServiceInstance;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

static NEXT_PORT: AtomicU16 = AtomicU16::new(21810);

#[derive(Debug)]
struct ServerState {
    connect_string: String,
    running: AtomicBool,
    services: RwLock<HashMap<String, Vec<ServiceInstance>>>,
}

/// In-memory coordination server with a unique connect string
pub struct TestingCoordinator {
    state: Arc<ServerState>,
}

impl TestingCoordinator {
    /// Start a new server on a fresh loopback connect string
    pub fn start() -> Self {
        let port = NEXT_PORT.fetch_add(1, Ordering::SeqCst);
        let connect_string = format!("127.0.0.1:{}", port);
        tracing::debug!("Testing coordinator started at {}", connect_string);
        Self {
            state: Arc::new(ServerState {
                connect_string,
                running: AtomicBool::new(true),
                services: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The connect string clients should use
    pub fn connect_string(&self) -> &str {
        &self.state.connect_string
    }

    /// Whether the server still accepts connections
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Stop the server; subsequent connects and calls fail with `Connection`
    pub fn stop(&self) {
        self.state.running.store(false, Ordering::SeqCst);
        tracing::debug!("Testing coordinator at {} stopped", self.state.connect_string);
    }

    /// Pre-populate a registered instance
    pub async fn seed(&self, instance: ServiceInstance) {
        let mut services = self.state.services.write().await;
        services
            .entry(instance.service_id.clone())
            .or_default()
            .push(instance);
    }

    /// Connector that reaches only this server, and only while it runs
    pub fn connector(&self) -> TestingConnector {
        TestingConnector {
            state: self.state.clone(),
        }
    }
}

/// Connector bound to one [`TestingCoordinator`]
pub struct TestingConnector {
    state: Arc<ServerState>,
}

#[async_trait]
impl CoordinatorConnector for TestingConnector {
    async fn connect(&self, connect_string: &str) -> Result<Arc<dyn Coordinator>, DiscoveryError> {
        if connect_string != self.state.connect_string {
            return Err(DiscoveryError::connection(
                connect_string,
                "no coordination service at this address",
            ));
        }
        if !self.state.running.load(Ordering::SeqCst) {
            return Err(DiscoveryError::connection(connect_string, "server is down"));
        }
        Ok(Arc::new(TestingSession {
            state: self.state.clone(),
        }))
    }
}

/// Established session against a [`TestingCoordinator`]
struct TestingSession {
    state: Arc<ServerState>,
}

impl TestingSession {
    fn ensure_running(&self) -> Result<(), DiscoveryError> {
        if self.state.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DiscoveryError::connection(
                &self.state.connect_string,
                "connection lost: server is down",
            ))
        }
    }
}

#[async_trait]
impl Coordinator for TestingSession {
    fn connect_string(&self) -> &str {
        &self.state.connect_string
    }

    async fn services(&self) -> Result<Vec<String>, DiscoveryError> {
        self.ensure_running()?;
        let services = self.state.services.read().await;
        Ok(services.keys().cloned().collect())
    }

    async fn instances_of(&self, service_id: &str) -> Result<Vec<ServiceInstance>, DiscoveryError> {
        self.ensure_running()?;
        let services = self.state.services.read().await;
        Ok(services.get(service_id).cloned().unwrap_or_default())
    }

    async fn register(&self, instance: ServiceInstance) -> Result<(), DiscoveryError> {
        self.ensure_running()?;
        let mut services = self.state.services.write().await;
        services
            .entry(instance.service_id.clone())
            .or_default()
            .push(instance);
        Ok(())
    }

    async fn deregister(&self, instance_id: Uuid) -> Result<(), DiscoveryError> {
        self.ensure_running()?;
        let mut services = self.state.services.write().await;
        for instances in services.values_mut() {
            instances.retain(|instance| instance.id != instance_id);
        }
        services.retain(|_, instances| !instances.is_empty());
        Ok(())
    }
}
