//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `askpti-server`
//! integration tests.
//!
//! - `TestApp`: A full application harness that spawns a real server on a random port,
//!   configured with a mock model endpoint. This is ideal for E2E tests of API endpoints.
//! - Helper functions for minting tokens and mocking model completions.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use askpti::config::get_config;
use askpti_server::{
    auth::middleware::Claims,
    router,
    state::{build_app_state, AppState},
};
use askpti_test_utils::{write_corpus_fixture, PTI_LOCATION, PTI_URL};
use axum::serve;
use httpmock::MockServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde_json::{json, Value};
use std::{
    fs::File,
    io::Write,
    net::SocketAddr,
    time::{SystemTime, UNIX_EPOCH},
};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_JWT_SECRET: &str = "askpti-test-secret";

/// A harness for end-to-end testing of the Axum server.
///
/// This struct spawns the server on a random available port, writes a corpus
/// fixture, and configures the model provider as a "local" provider pointed at
/// an `httpmock::MockServer` instance.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _corpus_file: NamedTempFile,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with the JWT secret configured.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Some(TEST_JWT_SECRET)).await
    }

    /// Spawns the application server, optionally without a JWT secret.
    pub async fn spawn_with(jwt_secret: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let corpus_file = write_corpus_fixture(&[(PTI_URL, PTI_LOCATION)])?;

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let jwt_line = jwt_secret
            .map(|secret| format!("jwt_secret: \"{secret}\""))
            .unwrap_or_default();
        let config_content = format!(
            r#"
port: 0
{}
corpus:
  path: "{}"
model:
  provider: "local"
  api_url: "{}"
  model_name: "mock-chat-model"
rooms:
  public:
    variant: "restrictive"
    max_sessions: 2
  private:
    variant: "unrestricted_internal"
"#,
            jwt_line,
            corpus_file.path().display(),
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _corpus_file: corpus_file,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// An OpenAI-style completion body carrying `text`.
pub fn completion(text: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
}

/// Generates a valid JWT for a given subject and optional email.
pub fn generate_jwt(sub: &str, email: Option<&str>) -> Result<String> {
    generate_jwt_with_expiry(sub, email, 3600)
}

/// Generates a JWT with a custom expiration, signed with the test secret.
/// A negative offset produces an already-expired token.
pub fn generate_jwt_with_expiry(sub: &str, email: Option<&str>, expires_in_secs: i64) -> Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    let claims = Claims {
        sub: sub.to_string(),
        exp: (now + expires_in_secs) as usize,
        email: email.map(str::to_string),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_ref()),
    )?;
    Ok(token)
}
