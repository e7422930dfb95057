//! End-to-end bootstrap tests for conditional config-discovery registration
//!
//! Boots a full bootstrap phase against an embedded testing coordinator and
//! observes the frozen registry through a close listener, then the
//! application context after handoff.

use kindling_core::{
    ApplicationContext, BootstrapConfig, BootstrapPhase, AUTO_REGISTRATION_ENABLED,
    CONFIG_DISCOVERY_ENABLED, COORDINATION_CONNECT_STRING,
};
use kindling_discovery::testing::TestingCoordinator;
use kindling_discovery::{
    AutoServiceRegistration, ConfigDiscoveryBootstrapper, DiscoveryClient, InstanceProviderFn,
    ServiceInstance,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn base_config(server: &TestingCoordinator) -> BootstrapConfig {
    BootstrapConfig::new()
        .with(COORDINATION_CONNECT_STRING, server.connect_string())
        .with(AUTO_REGISTRATION_ENABLED, "false")
}

#[tokio::test]
async fn not_enabled_does_not_add_instance_provider_fn() {
    init_tracing();
    let server = TestingCoordinator::start();
    let context = ApplicationContext::new();

    let provider_absent = Arc::new(AtomicBool::new(false));
    let client_absent = Arc::new(AtomicBool::new(false));
    let provider_seen = provider_absent.clone();
    let client_seen = client_absent.clone();

    BootstrapPhase::new(base_config(&server))
        .add_bootstrapper(ConfigDiscoveryBootstrapper::new(Arc::new(server.connector())))
        .add_close_listener(move |event| {
            provider_seen.store(event.get::<InstanceProviderFn>().is_none(), Ordering::SeqCst);
            client_seen.store(event.get::<DiscoveryClient>().is_none(), Ordering::SeqCst);
        })
        .run(&context)
        .await
        .unwrap();

    assert!(
        provider_absent.load(Ordering::SeqCst),
        "InstanceProviderFn was created when it shouldn't have been"
    );
    assert!(
        client_absent.load(Ordering::SeqCst),
        "DiscoveryClient was created when it shouldn't have been"
    );
    assert!(context.try_resolve::<InstanceProviderFn>().is_none());
    assert!(context.try_resolve::<DiscoveryClient>().is_none());
}

#[tokio::test]
async fn enabled_adds_instance_provider_fn() {
    init_tracing();
    let server = TestingCoordinator::start();
    let context = ApplicationContext::new();

    let bootstrap_client: Arc<Mutex<Option<Arc<DiscoveryClient>>>> = Arc::new(Mutex::new(None));
    let capture = bootstrap_client.clone();

    let config = base_config(&server).with(CONFIG_DISCOVERY_ENABLED, "true");
    let report = BootstrapPhase::new(config)
        .add_bootstrapper(ConfigDiscoveryBootstrapper::new(Arc::new(server.connector())))
        .add_close_listener(move |event| {
            assert!(
                event.get::<InstanceProviderFn>().is_some(),
                "InstanceProviderFn was not created when it should have been"
            );
            *capture.lock().unwrap() = event.get::<DiscoveryClient>();
        })
        .run(&context)
        .await
        .unwrap();

    assert_eq!(report.entries_handed_off, 2);

    // The client in the context is the same object observed at close time.
    let discovery_client = context.resolve::<DiscoveryClient>().unwrap();
    let captured = bootstrap_client.lock().unwrap().take().unwrap();
    assert!(Arc::ptr_eq(&discovery_client, &captured));

    // The handed-off provider resolves through the live server.
    server
        .seed(ServiceInstance::new("config-server", "localhost", 8888))
        .await;
    let provider = context.resolve::<InstanceProviderFn>().unwrap();
    let instances = provider.resolve("config-server").await.unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].uri(), "http://localhost:8888");
}

#[tokio::test]
async fn local_instance_registration_survives_handoff() {
    init_tracing();
    let server = TestingCoordinator::start();
    let context = ApplicationContext::new();

    let config = base_config(&server)
        .with(CONFIG_DISCOVERY_ENABLED, "true")
        .with(AUTO_REGISTRATION_ENABLED, "true");
    let report = BootstrapPhase::new(config)
        .add_bootstrapper(
            ConfigDiscoveryBootstrapper::new(Arc::new(server.connector()))
                .with_local_instance(ServiceInstance::new("billing", "localhost", 9000)),
        )
        .run(&context)
        .await
        .unwrap();

    assert_eq!(report.entries_handed_off, 3);

    // The adopted registration announces through the adopted client.
    let registration = context.resolve::<AutoServiceRegistration>().unwrap();
    assert!(registration.start().await.unwrap());
    let client = context.resolve::<DiscoveryClient>().unwrap();
    assert_eq!(client.instances("billing").await.unwrap().len(), 1);

    registration.stop().await.unwrap();
    assert!(client.instances("billing").await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_coordination_service_aborts_startup() {
    init_tracing();
    let server = TestingCoordinator::start();
    let connector = Arc::new(server.connector());
    server.stop();

    let context = ApplicationContext::new();
    let listener_fired = Arc::new(AtomicBool::new(false));
    let fired = listener_fired.clone();

    let config = base_config(&server).with(CONFIG_DISCOVERY_ENABLED, "true");
    let result = BootstrapPhase::new(config)
        .add_bootstrapper(ConfigDiscoveryBootstrapper::new(connector))
        .add_close_listener(move |_| fired.store(true, Ordering::SeqCst))
        .run(&context)
        .await;

    assert!(result.unwrap_err().is_bootstrap());

    // No close event, no partial handoff.
    assert!(!listener_fired.load(Ordering::SeqCst));
    assert!(context.try_resolve::<DiscoveryClient>().is_none());
    assert!(context.try_resolve::<InstanceProviderFn>().is_none());
    assert_eq!(context.service_count(), 0);
}

#[tokio::test]
async fn running_the_bootstrapper_twice_trips_write_once() {
    init_tracing();
    let server = TestingCoordinator::start();
    let context = ApplicationContext::new();

    let config = base_config(&server).with(CONFIG_DISCOVERY_ENABLED, "true");
    let result = BootstrapPhase::new(config)
        .add_bootstrapper(ConfigDiscoveryBootstrapper::new(Arc::new(server.connector())))
        .add_bootstrapper(ConfigDiscoveryBootstrapper::new(Arc::new(server.connector())))
        .run(&context)
        .await;

    assert!(result.unwrap_err().is_duplicate_key());
    assert_eq!(context.service_count(), 0);
}
