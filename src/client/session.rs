//! Token lifecycle: base-URL/auth-requirement resolution and the OAuth
//! token exchange.

use crate::client::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::config::{AuthMode, Credentials};
use crate::error::{RedditError, Result};
use log::debug;
use reqwest::Method;
use std::sync::Mutex;

pub const PUBLIC_BASE_URL: &str = "https://www.reddit.com";
pub const OAUTH_BASE_URL: &str = "https://oauth.reddit.com";
pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Refresh slightly early so a token never expires mid-request.
const EXPIRY_BUFFER_SECS: u64 = 300;

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    expires_at: u64,
    authenticated: bool,
}

impl TokenState {
    fn is_valid(&self) -> bool {
        self.access_token.is_some()
            && chrono::Utc::now().timestamp() as u64 + EXPIRY_BUFFER_SECS < self.expires_at
    }
}

/// Owns the bearer token, its expiry, and the base-URL decision derived from
/// the configured trust mode.
///
/// The state mutex is never held across an await point, so two concurrent
/// callers can both observe an expired token and both perform the exchange.
/// That redundancy is tolerated (the exchange is idempotent, just wasteful)
/// rather than serialized behind a single-flight guard.
pub struct TokenSession {
    credentials: Credentials,
    mode: AuthMode,
    base_url: &'static str,
    authenticate: bool,
    state: Mutex<TokenState>,
}

impl TokenSession {
    pub fn new(credentials: Credentials, mode: AuthMode) -> Result<Self> {
        let (base_url, authenticate) = resolve_base_url(mode, credentials.has_client_credentials())?;
        debug!(
            "token session using {} (authenticate: {})",
            base_url, authenticate
        );
        Ok(Self {
            credentials,
            mode,
            base_url,
            authenticate,
            state: Mutex::new(TokenState::default()),
        })
    }

    pub fn base_url(&self) -> &'static str {
        self.base_url
    }

    /// Whether requests through this session carry a bearer token.
    pub fn requires_auth(&self) -> bool {
        self.authenticate
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.state.lock().unwrap().access_token.clone()
    }

    /// True once a token exchange has succeeded, even if the token has since
    /// lapsed. Gate for the single 401 retry.
    pub fn was_authenticated(&self) -> bool {
        self.state.lock().unwrap().authenticated
    }

    /// Obtain a token if one is needed and not already valid.
    ///
    /// No-op in anonymous mode and in auto mode without credentials; requests
    /// then proceed without a bearer token. `force` discards the current
    /// token first, for the post-401 refresh.
    pub async fn ensure_authenticated(
        &self,
        transport: &dyn HttpTransport,
        force: bool,
    ) -> Result<()> {
        if !self.authenticate {
            return Ok(());
        }
        if !force && self.state.lock().unwrap().is_valid() {
            debug!("reusing access token within expiry window");
            return Ok(());
        }

        let response = self.exchange_token(transport).await?;
        if !response.is_success() {
            return Err(RedditError::Auth(format!(
                "token exchange failed with HTTP {}: {}",
                response.status,
                truncate(&response.body, 200)
            )));
        }

        let json = response.json()?;
        if let Some(error) = json["error"].as_str() {
            return Err(RedditError::Auth(format!(
                "token exchange rejected: {}",
                error
            )));
        }

        let token = json["access_token"]
            .as_str()
            .ok_or_else(|| {
                RedditError::Auth("token response did not contain an access token".to_string())
            })?
            .to_string();
        let expires_in = json["expires_in"].as_u64().unwrap_or(3600);
        let now = chrono::Utc::now().timestamp() as u64;

        let mut state = self.state.lock().unwrap();
        state.access_token = Some(token);
        state.expires_at = now + expires_in;
        state.authenticated = true;
        debug!("access token obtained, expires in {}s", expires_in);

        Ok(())
    }

    async fn exchange_token(&self, transport: &dyn HttpTransport) -> Result<HttpResponse> {
        // password grant when user credentials are configured, otherwise an
        // application-only client_credentials grant
        let form: Vec<(String, String)> = match (&self.credentials.username, &self.credentials.password)
        {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                debug!("requesting token via password grant for {}", username);
                vec![
                    ("grant_type".to_string(), "password".to_string()),
                    ("username".to_string(), username.clone()),
                    ("password".to_string(), password.clone()),
                ]
            }
            _ => {
                debug!("requesting token via client_credentials grant");
                vec![("grant_type".to_string(), "client_credentials".to_string())]
            }
        };

        let client_id = self.credentials.client_id.as_deref().unwrap_or_default();
        let client_secret = self.credentials.client_secret.as_deref().unwrap_or_default();
        let auth = base64::encode(format!("{}:{}", client_id, client_secret));

        transport
            .execute(HttpRequest {
                method: Method::POST,
                url: TOKEN_URL.to_string(),
                headers: vec![
                    ("Authorization".to_string(), format!("Basic {}", auth)),
                    ("User-Agent".to_string(), self.credentials.user_agent.clone()),
                ],
                form: Some(form),
            })
            .await
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }
}

/// Map trust mode and credential availability to a base host.
fn resolve_base_url(mode: AuthMode, has_credentials: bool) -> Result<(&'static str, bool)> {
    match mode {
        AuthMode::Authenticated => {
            if !has_credentials {
                return Err(RedditError::Config(
                    "authenticated mode requires REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET"
                        .to_string(),
                ));
            }
            Ok((OAUTH_BASE_URL, true))
        }
        AuthMode::Anonymous => Ok((PUBLIC_BASE_URL, false)),
        AuthMode::Auto => {
            if has_credentials {
                Ok((OAUTH_BASE_URL, true))
            } else {
                Ok((PUBLIC_BASE_URL, false))
            }
        }
    }
}

fn truncate(body: &str, limit: usize) -> &str {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
