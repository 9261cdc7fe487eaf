//! Caller identity for API consumers.
//!
//! A [`SessionContext`] is an explicit value handed to whatever needs to know
//! who is signed in. Token validity is decided by an injected
//! [`TokenVerifier`]; the HTTP implementation caches verdicts per token.

use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::client::{send_json, ClientConfig, ClientError};

/// Account details returned by the auth endpoints. Opaque beyond display.
pub type SessionUser = serde_json::Value;

/// Body of a successful login or signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Resolves a bearer token to the user it belongs to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` means the token was rejected; `Err` means it could not be checked.
    async fn verify(&self, token: &str) -> Result<Option<SessionUser>, ClientError>;

    /// Forgets anything remembered about `token`.
    async fn forget(&self, _token: &str) {}
}

/// Verifies tokens against `GET /api/auth/verify`.
#[derive(Clone)]
pub struct HttpTokenVerifier {
    client: reqwest::Client,
    verify_url: Url,
    cache: Cache<String, SessionUser>,
}

impl HttpTokenVerifier {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_ttl(config, Duration::from_secs(300))
    }

    pub fn with_ttl(config: &ClientConfig, ttl: Duration) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;
        let verify_url = config
            .base_url
            .join("/api/auth/verify")
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            verify_url,
            cache: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(1_000)
                .build(),
        })
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<SessionUser>, ClientError> {
        if let Some(user) = self.cache.get(token).await {
            tracing::debug!("Token verification served from cache");
            return Ok(Some(user));
        }

        let request = self.client.get(self.verify_url.clone()).bearer_auth(token);
        match send_json::<SessionUser>(request).await {
            Ok(user) => {
                self.cache.insert(token.to_string(), user.clone()).await;
                Ok(Some(user))
            }
            Err(ClientError::Api { status, .. }) if status == 401 || status == 403 => {
                tracing::info!("Stored token rejected ({})", status);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn forget(&self, token: &str) {
        self.cache.invalidate(token).await;
    }
}

/// What the navigation bar offers for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Login,
    Logout,
}

impl NavAction {
    pub fn label(&self) -> &'static str {
        match self {
            NavAction::Login => "Login",
            NavAction::Logout => "Logout",
        }
    }
}

/// Who is signed in, if anyone.
#[derive(Clone)]
pub struct SessionContext {
    verifier: Arc<dyn TokenVerifier>,
    token: Option<String>,
    user: Option<SessionUser>,
}

impl SessionContext {
    /// An anonymous session.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            verifier,
            token: None,
            user: None,
        }
    }

    /// Rebuilds a session from a stored token.
    ///
    /// A rejected token leaves the session anonymous and drops the token. A
    /// verification outage also leaves it anonymous but reports the error.
    pub async fn restore(&mut self, token: &str) -> Result<(), ClientError> {
        match self.verifier.verify(token).await {
            Ok(Some(user)) => {
                self.token = Some(token.to_string());
                self.user = Some(user);
                Ok(())
            }
            Ok(None) => {
                self.clear();
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Adopts the token and user returned by login or signup.
    pub fn sign_in(&mut self, response: AuthResponse) {
        self.token = Some(response.token);
        self.user = Some(response.user);
    }

    pub async fn logout(&mut self) {
        if let Some(token) = self.token.take() {
            self.verifier.forget(&token).await;
        }
        self.user = None;
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// `Authorization` header value for authenticated calls.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }

    pub fn nav_action(&self) -> NavAction {
        if self.is_authenticated() {
            NavAction::Logout
        } else {
            NavAction::Login
        }
    }
}

/// Calls the login and signup endpoints.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(e.to_string()))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let url = self.endpoint("/api/auth/login")?;
        tracing::info!("Logging in {}", email);
        send_json(self.client.post(url).json(&Credentials { email, password })).await
    }

    /// Registers an account. `details` is forwarded as-is.
    pub async fn signup(&self, details: &serde_json::Value) -> Result<AuthResponse, ClientError> {
        let url = self.endpoint("/api/auth/signup")?;
        send_json(self.client.post(url).json(details)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedVerifier(Option<SessionUser>);

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        async fn verify(&self, _token: &str) -> Result<Option<SessionUser>, ClientError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenVerifier;

    #[async_trait]
    impl TokenVerifier for BrokenVerifier {
        async fn verify(&self, _token: &str) -> Result<Option<SessionUser>, ClientError> {
            Err(ClientError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_restore_with_accepted_token() {
        let mut session = SessionContext::new(Arc::new(FixedVerifier(Some(json!({"name": "Meera"})))));
        assert_eq!(session.nav_action(), NavAction::Login);

        session.restore("tok").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.bearer().as_deref(), Some("Bearer tok"));
        assert_eq!(session.nav_action(), NavAction::Logout);

        session.logout().await;
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.nav_action().label(), "Login");
    }

    #[tokio::test]
    async fn test_rejected_token_is_dropped() {
        let mut session = SessionContext::new(Arc::new(FixedVerifier(None)));
        session.restore("stale").await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_verifier_outage_leaves_session_anonymous() {
        let mut session = SessionContext::new(Arc::new(BrokenVerifier));
        assert!(session.restore("tok").await.is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_sign_in_adopts_response() {
        let mut session = SessionContext::new(Arc::new(FixedVerifier(None)));
        session.sign_in(AuthResponse {
            token: "fresh".to_string(),
            user: json!({"email": "meera@example.com"}),
        });
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap()["email"], "meera@example.com");
    }
}
