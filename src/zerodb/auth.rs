use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::core::config::ZeroDbConfig;
use crate::core::errors::ChatError;

/// Short-lived bearer credential returned by the login exchange.
///
/// Request-scoped: acquired fresh per chat turn and dropped when the turn
/// completes. There is deliberately no cache or reuse window.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub expires_in: u64,
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange the configured service credentials for a bearer token.
    async fn acquire_token(&self) -> Result<AuthToken, ChatError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Clone)]
pub struct ZeroDbAuthClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl ZeroDbAuthClient {
    pub fn new(config: &ZeroDbConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client: Client::new(),
        }
    }
}

/// The login endpoint takes a form body, not JSON.
fn login_form_body(username: &str, password: &str) -> String {
    format!(
        "username={}&password={}",
        urlencoding::encode(username),
        urlencoding::encode(password)
    )
}

#[async_trait]
impl TokenProvider for ZeroDbAuthClient {
    async fn acquire_token(&self) -> Result<AuthToken, ChatError> {
        let url = format!("{}/v1/public/auth/login", self.base_url);

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(login_form_body(&self.username, &self.password))
            .send()
            .await
            .map_err(ChatError::network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(ChatError::Authentication {
                status: status.as_u16(),
            });
        }

        let payload: LoginResponse = res.json().await.map_err(ChatError::network)?;
        Ok(AuthToken {
            token: payload.access_token,
            expires_in: payload.expires_in,
        })
    }
}
