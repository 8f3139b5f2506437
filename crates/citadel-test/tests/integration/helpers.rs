#![allow(dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building an isolated application (one per test)
//! - Seeding users, grants and role assignments
//! - Making HTTP requests against the Salvo service
//! - Asserting on the `{code, message, data}` envelope
//!
//! ## Isolation
//! Every `TestApp` owns its own in-memory store, policy store and session
//! table, so tests can run in parallel without sharing state.

use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::Value;

use citadel_test::app::state::AppState;
use citadel_test::component::auth::Subject;
use citadel_test::component::auth::password::hash_password;
use citadel_test::component::config::{
    AuthConfig, LoggingConfig, SeedConfig, ServerConfig, Settings,
};
use citadel_test::component::model::{NewUser, Status, User};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Test configuration - static struct instead of loading from the environment.
#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
            cors_origin: None,
        },
        auth: AuthConfig {
            token_ttl_seconds: 3600,
            max_role_depth: 10,
            policy_file: None,
        },
        seed: SeedConfig {
            admin_username: ADMIN_USERNAME.to_string(),
            admin_password: ADMIN_PASSWORD.to_string(),
            demo_data: true,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// A fully wired application with demo menus and roles, plus the
/// super-admin account.
pub struct TestApp {
    pub state: AppState,
    service: Service,
}

impl TestApp {
    /// ## Errors
    /// Returns an error if bootstrapping the application fails.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_settings(test_settings()).await
    }

    /// ## Errors
    /// Returns an error if bootstrapping the application fails.
    pub async fn with_settings(settings: Settings) -> anyhow::Result<Self> {
        let state = AppState::bootstrap(settings).await?;
        let service = state.service();
        Ok(Self { state, service })
    }

    #[must_use]
    pub const fn service(&self) -> &Service {
        &self.service
    }

    /// Creates an enabled, non-super-admin user.
    ///
    /// ## Errors
    /// Returns an error if hashing or the insert fails.
    pub async fn seed_user(&self, username: &str, password: &str) -> anyhow::Result<User> {
        self.seed_user_with_status(username, password, Status::Enable)
            .await
    }

    /// ## Errors
    /// Returns an error if hashing or the insert fails.
    pub async fn seed_user_with_status(
        &self,
        username: &str,
        password: &str,
        status: Status,
    ) -> anyhow::Result<User> {
        Ok(self
            .state
            .store
            .create_user(NewUser {
                username: username.to_string(),
                nickname: username.to_string(),
                password_hash: hash_password(password)?,
                super_admin: false,
                status,
            })
            .await?)
    }

    async fn subject_of(&self, username: &str) -> anyhow::Result<Subject> {
        let user = self
            .state
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no user '{username}'"))?;
        Ok(Subject::from_user(&user))
    }

    /// Grants a permission code directly to a user.
    ///
    /// ## Errors
    /// Returns an error if the user does not exist or the policy update fails.
    pub async fn grant(&self, username: &str, code: &str) -> anyhow::Result<()> {
        let subject = self.subject_of(username).await?;
        self.state.policy.add_permission(&subject, code).await?;
        Ok(())
    }

    /// ## Errors
    /// Returns an error if the user does not exist or the policy update fails.
    pub async fn revoke(&self, username: &str, code: &str) -> anyhow::Result<()> {
        let subject = self.subject_of(username).await?;
        self.state.policy.delete_permission(&subject, code).await?;
        Ok(())
    }

    /// ## Errors
    /// Returns an error if the user does not exist or the policy update fails.
    pub async fn assign_role(&self, username: &str, role_code: &str) -> anyhow::Result<()> {
        let subject = self.subject_of(username).await?;
        self.state.policy.add_role(&subject, role_code).await?;
        Ok(())
    }

    /// ## Errors
    /// Returns an error if no role has the code.
    pub async fn role_id(&self, code: &str) -> anyhow::Result<u64> {
        self.state
            .store
            .find_role_by_code(code)
            .await?
            .map(|role| role.id)
            .ok_or_else(|| anyhow::anyhow!("no role '{code}'"))
    }

    /// ## Errors
    /// Returns an error if no menu has the code.
    pub async fn menu_id(&self, code: &str) -> anyhow::Result<u64> {
        self.state
            .store
            .list_menus(None)
            .await?
            .into_iter()
            .find(|menu| menu.code == code)
            .map(|menu| menu.id)
            .ok_or_else(|| anyhow::anyhow!("no menu '{code}'"))
    }

    /// Logs in over HTTP and returns the token.
    ///
    /// ## Panics
    /// Panics if the login is rejected.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = TestRequest::post("/admin/passport/login")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send(self.service())
            .await
            .assert_status(StatusCode::OK);

        response.data()["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}

/// Builder for HTTP test requests.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequest {
    /// Creates a new test request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a new GET request.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a new POST request.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Creates a new PUT request.
    #[must_use]
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Creates a new DELETE request.
    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {token}"))
    }

    /// Sets the Content-Type header.
    #[must_use]
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("Content-Type", content_type)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON request body.
    #[must_use]
    pub fn json(self, value: &Value) -> Self {
        self.content_type("application/json")
            .body(value.to_string().into_bytes())
    }

    /// Sends the request to the test service and returns the response.
    ///
    /// ## Panics
    /// Panics if the request cannot be sent or the response cannot be read.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "POST" => TestClient::post(&url),
            "PUT" => TestClient::put(&url),
            "DELETE" => TestClient::delete(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut response = client.send(service).await;

        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body: Vec<u8> = response.take_bytes(None).await.unwrap_or_default().to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Asserts that the response status matches the expected code.
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {expected} but got {}: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts both the HTTP status and the envelope `code` match `expected`.
    pub fn assert_envelope(self, expected: StatusCode) -> Self {
        let this = self.assert_status(expected);
        assert_eq!(
            this.json()["code"],
            expected.as_u16(),
            "Envelope code does not mirror the status"
        );
        this
    }

    /// Asserts that the response body contains the expected substring.
    pub fn assert_body_contains(self, expected: &str) -> Self {
        let body = String::from_utf8_lossy(&self.body);
        assert!(
            body.contains(expected),
            "Expected body to contain '{expected}' but got:\n{body}"
        );
        self
    }

    /// Parses the body as JSON.
    ///
    /// ## Panics
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Body is not JSON ({e}):\n{}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// The envelope's `data` field.
    #[must_use]
    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }
}

/// Collects every `code` in a serialized menu tree, depth first.
#[must_use]
pub fn tree_codes(nodes: &Value) -> Vec<String> {
    let mut codes = Vec::new();
    if let Some(nodes) = nodes.as_array() {
        for node in nodes {
            if let Some(code) = node["code"].as_str() {
                codes.push(code.to_string());
            }
            codes.extend(tree_codes(&node["children"]));
        }
    }
    codes
}
