#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use registration_intake::config::{Config, NotifyFailurePolicy, StoreConfig};
use registration_intake::email::{Notifier, NotifyError};
use registration_intake::registration::{NewRecord, Receipt, RegistrationRecord};
use registration_intake::state::AppState;
use registration_intake::store::memory::MemoryStore;
use registration_intake::store::{RegistrationStore, StoreError};

/// A running intake server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub notifications: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body to the intake endpoint, return the response body + status.
    pub async fn submit(&self, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/registrations"))
            .json(body)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn submit_from(&self, ip: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/registrations"))
            .header("client-ip", ip)
            .json(body)
            .send()
            .await
            .expect("submit request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn valid_submission() -> Value {
    json!({
        "parentName": "Dana Whitfield",
        "email": "dana@example.com",
        "phone": "+1 555 0100",
        "childName": "Robin Whitfield",
        "academicPath": "stem",
        "message": "Interested in the autumn intake."
    })
}

pub fn test_config(policy: NotifyFailurePolicy) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        max_body_size: 65_536,
        allowed_origins: vec![],
        client_ip_header: "client-ip".to_string(),
        store: StoreConfig::Memory,
        mail: None,
        notify_failure_policy: policy,
    }
}

/// Spawn the app with an in-memory store and a recording notifier.
pub async fn spawn_app() -> TestApp {
    let notifications = Arc::new(RecordingNotifier::default());
    spawn_with(
        Some(notifications.clone() as Arc<dyn Notifier>),
        notifications,
        NotifyFailurePolicy::Fatal,
    )
    .await
}

pub async fn spawn_app_without_notifier() -> TestApp {
    spawn_with(
        None,
        Arc::new(RecordingNotifier::default()),
        NotifyFailurePolicy::Fatal,
    )
    .await
}

pub async fn spawn_app_with_failing_notifier(policy: NotifyFailurePolicy) -> TestApp {
    spawn_with(
        Some(Arc::new(FailingNotifier)),
        Arc::new(RecordingNotifier::default()),
        policy,
    )
    .await
}

async fn spawn_with(
    notifier: Option<Arc<dyn Notifier>>,
    notifications: Arc<RecordingNotifier>,
    policy: NotifyFailurePolicy,
) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        config: test_config(policy),
        store: store.clone(),
        notifier,
    };

    let addr = serve(state).await;

    TestApp {
        addr,
        client: Client::new(),
        store,
        notifications,
    }
}

/// Bind the app to a random port and serve it in the background.
pub async fn serve(state: AppState) -> SocketAddr {
    let app = registration_intake::build_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(RegistrationRecord, Receipt)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(RegistrationRecord, Receipt)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, record: &RegistrationRecord, receipt: &Receipt) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((record.clone(), receipt.clone()));
        Ok(())
    }
}

/// Behaves like a mail transport that refuses every message.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _: &RegistrationRecord, _: &Receipt) -> Result<(), NotifyError> {
        Err(NotifyError::from(
            "Failed to send email: 535 authentication rejected".to_string(),
        ))
    }
}

/// A store whose every write fails.
pub struct UnreachableStore;

#[async_trait]
impl RegistrationStore for UnreachableStore {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn add(&self, _: &NewRecord) -> Result<Receipt, StoreError> {
        Err(StoreError::Transport("connection refused".to_string()))
    }
}
