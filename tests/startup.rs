//! Integration tests for the startup sequence

use async_trait::async_trait;
use mqtrigger::config::{
    ControlPlaneConfig, MessageQueueConfig, ENV_MESSAGE_QUEUE_SECRETS, ENV_MESSAGE_QUEUE_TYPE,
    ENV_MESSAGE_QUEUE_URL,
};
use mqtrigger::control_plane::{ControlPlane, ControlPlaneError, HttpControlPlane};
use mqtrigger::mq::{
    self, BackendRegistry, MessageQueue, MessageQueueTrigger, Subscription, SubscriptionSet,
};
use mqtrigger::trigger::TriggerManager;
use mqtrigger::{Bootstrap, Environment, Error};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_test::traced_test;

const ROUTER: &str = "http://router.test";

#[derive(Debug, Default)]
struct FakeControlPlane {
    unavailable: bool,
    waits: AtomicUsize,
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    fn endpoint(&self) -> &str {
        "http://controller.test"
    }

    async fn wait_for_schemas(&self) -> Result<(), ControlPlaneError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ControlPlaneError::invalid_response("schemas never installed"));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct RecordingQueue {
    url: String,
    router_url: String,
    active: SubscriptionSet,
}

impl MessageQueue for RecordingQueue {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn broker_url(&self) -> &str {
        &self.url
    }

    fn router_url(&self) -> &str {
        &self.router_url
    }

    fn subscribe(&self, trigger: &MessageQueueTrigger) -> mq::Result<Subscription> {
        self.active.add(trigger)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> mq::Result<()> {
        self.active.remove(subscription)
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        self.active.snapshot()
    }
}

/// Registry with the built-in backends plus a `recording` kind that keeps
/// every configuration it is handed.
fn recording_registry() -> (BackendRegistry, Arc<Mutex<Vec<MessageQueueConfig>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut registry = BackendRegistry::with_builtin_backends();
    let sink = received.clone();
    registry.register("recording", move |router_url: &str, config: MessageQueueConfig| {
        let queue = RecordingQueue {
            url: config.url.clone(),
            router_url: router_url.to_string(),
            active: SubscriptionSet::new("recording"),
        };
        sink.lock().unwrap().push(config);
        Ok(Box::new(queue) as Box<dyn MessageQueue>)
    });
    (registry, received)
}

#[derive(Debug, Clone, PartialEq)]
struct Handoff {
    control_plane: String,
    kind: &'static str,
    broker_url: String,
    router_url: String,
}

struct RecordingManager {
    control_plane: Arc<dyn ControlPlane>,
    queue: Box<dyn MessageQueue>,
    seen: Arc<Mutex<Option<Handoff>>>,
}

#[async_trait]
impl TriggerManager for RecordingManager {
    async fn run(self) {
        *self.seen.lock().unwrap() = Some(Handoff {
            control_plane: self.control_plane.endpoint().to_string(),
            kind: self.queue.kind(),
            broker_url: self.queue.broker_url().to_string(),
            router_url: self.queue.router_url().to_string(),
        });
    }
}

struct Harness {
    control_plane: Arc<FakeControlPlane>,
    received: Arc<Mutex<Vec<MessageQueueConfig>>>,
    seen: Arc<Mutex<Option<Handoff>>>,
}

impl Harness {
    fn new(control_plane: FakeControlPlane) -> Self {
        Self {
            control_plane: Arc::new(control_plane),
            received: Arc::new(Mutex::new(Vec::new())),
            seen: Arc::new(Mutex::new(None)),
        }
    }

    async fn run(&mut self, env: Environment) -> mqtrigger::Result<()> {
        let (registry, received) = recording_registry();
        self.received = received;

        let control_plane = self.control_plane.clone();
        let seen = self.seen.clone();
        Bootstrap::new(env, ROUTER, registry)
            .run(
                move || Ok(control_plane as Arc<dyn ControlPlane>),
                move |control_plane, queue| RecordingManager { control_plane, queue, seen },
            )
            .await
    }

    fn constructed(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    fn handoff(&self) -> Option<Handoff> {
        self.seen.lock().unwrap().clone()
    }
}

fn secrets_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user"), b"alice").unwrap();
    fs::write(dir.path().join("pass"), b"s3cr3t").unwrap();
    fs::write(dir.path().join(".staging"), b"x").unwrap();
    dir
}

#[tokio::test]
async fn test_happy_path_hands_backend_to_manager() {
    let dir = secrets_dir();
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "recording")
        .with_var(ENV_MESSAGE_QUEUE_URL, "amqp://broker:5672")
        .with_var(ENV_MESSAGE_QUEUE_SECRETS, format!("  {}\n", dir.path().display()));

    let mut harness = Harness::new(FakeControlPlane::default());
    harness.run(env).await.unwrap();

    assert_eq!(harness.control_plane.waits.load(Ordering::SeqCst), 1);

    let received = harness.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let config = &received[0];
    assert_eq!(config.kind, "recording");
    assert_eq!(config.url, "amqp://broker:5672");
    let mut names: Vec<&str> = config.secrets.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(names, vec!["pass", "user"]);
    assert_eq!(config.secrets["user"].expose_secret(), b"alice");

    assert_eq!(
        harness.handoff(),
        Some(Handoff {
            control_plane: "http://controller.test".to_string(),
            kind: "recording",
            broker_url: "amqp://broker:5672".to_string(),
            router_url: ROUTER.to_string(),
        })
    );
}

#[tokio::test]
async fn test_control_plane_failure_stops_before_secrets() {
    let dir = TempDir::new().unwrap();
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "recording")
        .with_var(ENV_MESSAGE_QUEUE_SECRETS, dir.path().join("missing").display().to_string());

    let mut harness = Harness::new(FakeControlPlane { unavailable: true, ..Default::default() });
    let err = harness.run(env).await.unwrap_err();

    assert!(matches!(err, Error::ControlPlane(_)), "got {:?}", err);
    assert!(!err.is_fatal());
    assert_eq!(harness.constructed(), 0);
    assert!(harness.handoff().is_none());
}

#[tokio::test]
async fn test_unbuildable_control_plane_client() {
    let config = ControlPlaneConfig { url: "controller.fission".to_string(), poll_interval_ms: 10 };
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();

    let registry = BackendRegistry::with_builtin_backends();
    let err = Bootstrap::new(Environment::default(), ROUTER, registry)
        .run(
            || Ok(Arc::new(HttpControlPlane::connect(&config)?) as Arc<dyn ControlPlane>),
            move |control_plane, queue| RecordingManager { control_plane, queue, seen: sink },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ControlPlane(ControlPlaneError::InvalidEndpoint { .. })));
    assert!(seen.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_missing_secrets_directory_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-mounted");
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "recording")
        .with_var(ENV_MESSAGE_QUEUE_SECRETS, missing.display().to_string());

    let mut harness = Harness::new(FakeControlPlane::default());
    let err = harness.run(env).await.unwrap_err();

    assert!(matches!(err, Error::Secrets(_)), "got {:?}", err);
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("not-mounted"));
    assert_eq!(harness.constructed(), 0);
    assert!(harness.handoff().is_none());
}

#[tokio::test]
async fn test_unsupported_kind_is_fatal() {
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "rabbitmq")
        .with_var(ENV_MESSAGE_QUEUE_URL, "amqp://broker:5672");

    let mut harness = Harness::new(FakeControlPlane::default());
    let err = harness.run(env).await.unwrap_err();

    assert!(matches!(err, Error::Backend(_)), "got {:?}", err);
    assert!(err.is_fatal());
    assert!(err.to_string().contains("rabbitmq"));
    assert_eq!(harness.constructed(), 0);
    assert!(harness.handoff().is_none());
}

#[tokio::test]
async fn test_unset_kind_is_fatal() {
    let mut harness = Harness::new(FakeControlPlane::default());
    let err = harness.run(Environment::default()).await.unwrap_err();

    assert!(err.is_fatal());
    assert!(harness.handoff().is_none());
}

#[tokio::test]
async fn test_blank_secrets_path_skips_loading() {
    for path in ["", "   ", "\t\n"] {
        let env = Environment::default()
            .with_var(ENV_MESSAGE_QUEUE_TYPE, "recording")
            .with_var(ENV_MESSAGE_QUEUE_SECRETS, path);

        let mut harness = Harness::new(FakeControlPlane::default());
        harness.run(env).await.unwrap();

        let received = harness.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1, "path {:?}", path);
        assert!(received[0].secrets.is_empty());
    }
}

#[tokio::test]
async fn test_builtin_nats_backend() {
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "nats-streaming")
        .with_var(ENV_MESSAGE_QUEUE_URL, "nats://nats.fission:4222");

    let mut harness = Harness::new(FakeControlPlane::default());
    harness.run(env).await.unwrap();

    let handoff = harness.handoff().unwrap();
    assert_eq!(handoff.kind, "nats-streaming");
    assert_eq!(handoff.router_url, ROUTER);
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_invalid_builtin_configuration_is_fatal() {
    let env = Environment::default()
        .with_var(ENV_MESSAGE_QUEUE_TYPE, "kafka")
        .with_var(ENV_MESSAGE_QUEUE_URL, "");

    let mut harness = Harness::new(FakeControlPlane::default());
    let err = harness.run(env).await.unwrap_err();

    assert!(matches!(err, Error::Backend(_)), "got {:?}", err);
    assert!(err.is_fatal());
}

#[tokio::test]
#[traced_test]
async fn test_logs_phase_transitions() {
    let env = Environment::default().with_var(ENV_MESSAGE_QUEUE_TYPE, "recording");

    let mut harness = Harness::new(FakeControlPlane::default());
    harness.run(env).await.unwrap();

    assert!(logs_contain("to=control_plane_ready"));
    assert!(logs_contain("to=backend_constructed"));
    assert!(logs_contain("to=running"));
}

#[tokio::test]
#[traced_test]
async fn test_logs_abort_with_last_phase() {
    let env = Environment::default().with_var(ENV_MESSAGE_QUEUE_TYPE, "rabbitmq");

    let mut harness = Harness::new(FakeControlPlane::default());
    assert!(harness.run(env).await.is_err());

    assert!(logs_contain("Startup aborted"));
    assert!(logs_contain("failed_after=secrets_loaded"));
}
