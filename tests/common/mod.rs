//! Shared helpers for the HTTP integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use grandstay::api::{create_router, AppState};
use grandstay::auth::Authenticator;
use grandstay::config::{Config, Environment};
use grandstay::error::{Error, Result};
use grandstay::payment::{PaymentGateway, PaymentIntent};
use grandstay::store::{Collection, Document, DocumentStore, MemoryStore, SharedStore};
use reqwest::header::{COOKIE, SET_COOKIE};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Payment gateway that records requested amounts instead of charging
#[derive(Default)]
pub struct RecordingGateway {
    amounts: Mutex<Vec<i64>>,
}

impl RecordingGateway {
    pub fn amounts(&self) -> Vec<i64> {
        self.amounts.lock().expect("gateway lock").clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent> {
        let mut amounts = self.amounts.lock().expect("gateway lock");
        amounts.push(amount);
        let id = format!("pi_test_{}", amounts.len());
        Ok(PaymentIntent {
            client_secret: format!("{}_secret", id),
            id,
            amount,
            currency: "usd".to_string(),
        })
    }
}

/// Store whose every operation fails, standing in for an unreachable database
pub struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn scan(&self, _collection: Collection) -> Result<Vec<Document>> {
        Err(Error::Other("database unavailable".to_string()))
    }

    async fn get(&self, _collection: Collection, _id: &str) -> Result<Option<Document>> {
        Err(Error::Other("database unavailable".to_string()))
    }

    async fn put(&self, _collection: Collection, _id: &str, _doc: Document) -> Result<()> {
        Err(Error::Other("database unavailable".to_string()))
    }

    async fn ping(&self) -> Result<()> {
        Err(Error::Other("database unavailable".to_string()))
    }
}

pub struct TestServer {
    pub base: String,
    pub config: Config,
    pub store: SharedStore,
    pub payments: Arc<RecordingGateway>,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sign in as `email` and return the `Cookie` header value to send back
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .client
            .post(self.url("/jwt"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .expect("POST /jwt");
        assert!(response.status().is_success());
        cookie_pair(&set_cookie(&response))
    }

    /// Store a user record with an optional role
    pub async fn add_user(&self, email: &str, role: Option<&str>) {
        let mut user = Document::new();
        user.insert("email".to_string(), email.into());
        if let Some(role) = role {
            user.insert("role".to_string(), role.into());
        }
        self.store
            .insert_one(Collection::Users, user)
            .await
            .expect("insert user");
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(COOKIE, cookie)
            .send()
            .await
            .expect("GET request")
    }

    pub async fn count(&self, collection: Collection) -> u64 {
        self.store.count(collection).await.expect("count")
    }
}

/// The raw `Set-Cookie` header of a response
pub fn set_cookie(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header")
        .to_string()
}

/// `name=value` part of a `Set-Cookie` header
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .trim()
        .to_string()
}

pub async fn start_test_server(environment: Environment) -> TestServer {
    start_with_store(environment, Arc::new(MemoryStore::new())).await
}

pub async fn start_with_store(environment: Environment, store: SharedStore) -> TestServer {
    let mut config = Config::default();
    config.server.environment = environment;

    let payments = Arc::new(RecordingGateway::default());
    let state = AppState::new(
        Authenticator::from_config(&config),
        store.clone(),
        payments.clone(),
    );
    let app = create_router(state, &config.server.allowed_origins);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        base: format!("http://{}", addr),
        config,
        store,
        payments,
        client: reqwest::Client::new(),
        handle,
    }
}
