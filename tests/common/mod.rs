#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use portfolio_api::auth::hash_password;
use portfolio_api::config::AppConfig;
use portfolio_api::database::models::{Role, User};
use portfolio_api::database::{MemoryStore, Store, UserStore};
use portfolio_api::state::AppState;
use portfolio_api::storage::{MemoryObjectStore, ObjectStore, StorageError, StorageResult};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

const BOUNDARY: &str = "----portfolio-test-boundary";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_rate_limiting = false;
    config.api.max_page_limit = 50;
    config
}

/// An in-process application over memory stores.
pub struct TestApp {
    pub state: AppState,
    pub objects: Arc<FlakyObjectStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let prefix = config.uploads.public_prefix.clone();
        let objects = Arc::new(FlakyObjectStore::new(&prefix));
        let state = AppState::new(config, Arc::new(MemoryStore::new()), objects.clone());
        let router = portfolio_api::app(state.clone());
        Self {
            state,
            objects,
            router,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.state.store
    }

    /// Seeds an admin account directly in the store and returns its token.
    pub async fn admin_token(&self) -> Result<String> {
        let user = match self.store().find_user_by_email(ADMIN_EMAIL).await? {
            Some(user) => user,
            None => {
                let hash = hash_password(ADMIN_PASSWORD, 4)?;
                self.store()
                    .create_user(User::new(ADMIN_EMAIL, "Admin", hash, Role::Admin))
                    .await?
            }
        };
        Ok(self.state.tokens.issue(&user)?)
    }

    /// Registers a regular account through the API and returns its token.
    pub async fn user_token(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/auth/register",
                None,
                serde_json::json!({ "email": email, "password": "secret123", "name": "Visitor" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {body}");
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from register response")
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(builder(Method::GET, uri, token).body(Body::empty())?)
            .await
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(builder(method, uri, token).body(Body::empty())?).await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        let request = builder(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?;
        self.send(request).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        parts: &[Part],
    ) -> Result<(StatusCode, Value)> {
        let request = builder(method, uri, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))?;
        self.send(request).await
    }
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub enum Part {
    Text(&'static str, String),
    File {
        name: &'static str,
        file_name: &'static str,
        content_type: &'static str,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Part::Text(name, value.into())
    }

    pub fn png(name: &'static str, file_name: &'static str) -> Self {
        Part::File {
            name,
            file_name,
            content_type: "image/png",
            bytes: vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4],
        }
    }

    pub fn pdf(name: &'static str, file_name: &'static str) -> Self {
        Part::File {
            name,
            file_name,
            content_type: "application/pdf",
            bytes: b"%PDF-1.4 test".to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Memory object store that can be told to refuse writes into one folder.
pub struct FlakyObjectStore {
    pub inner: MemoryObjectStore,
    fail_folder: std::sync::Mutex<Option<String>>,
}

impl FlakyObjectStore {
    pub fn new(prefix: &str) -> Self {
        Self {
            inner: MemoryObjectStore::new(prefix),
            fail_folder: std::sync::Mutex::new(None),
        }
    }

    pub fn fail_writes_to(&self, folder: &str) {
        if let Ok(mut guard) = self.fail_folder.lock() {
            *guard = Some(format!("{}/", folder));
        }
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.contains(url).await
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<String> {
        let refused = self
            .fail_folder
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .is_some_and(|folder| key.starts_with(&folder));
        if refused {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated outage"),
            });
        }
        self.inner.put(key, bytes, content_type).await
    }

    async fn delete(&self, url_or_key: &str) -> StorageResult<()> {
        self.inner.delete(url_or_key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}
