//! Configuration module for handling environment variables and .env files

use crate::error::{RedditError, Result};
use dotenv::dotenv;
use log::info;
use std::env;
use std::str::FromStr;

/// Trust mode for the client, fixed at construction.
///
/// Determines both the base URL (OAuth host vs public host) and whether a
/// missing credential is fatal or silently degrades to unauthenticated
/// requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// OAuth host iff client credentials are configured, public host otherwise.
    Auto,
    /// OAuth host; missing client credentials are a configuration error.
    Authenticated,
    /// Public host; never attempts a token exchange.
    Anonymous,
}

impl FromStr for AuthMode {
    type Err = RedditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(AuthMode::Auto),
            "authenticated" => Ok(AuthMode::Authenticated),
            "anonymous" => Ok(AuthMode::Anonymous),
            other => Err(RedditError::Config(format!(
                "unknown auth mode '{}', expected auto, authenticated or anonymous",
                other
            ))),
        }
    }
}

/// Which external provider supplies the client secret and password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretProvider {
    #[default]
    Env,
    GitCredential,
    PassCli,
}

impl FromStr for SecretProvider {
    type Err = RedditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "env" => Ok(SecretProvider::Env),
            "git-credential" => Ok(SecretProvider::GitCredential),
            "pass-cli" => Ok(SecretProvider::PassCli),
            other => Err(RedditError::Config(format!(
                "unknown secret provider '{}', expected env, git-credential or pass-cli",
                other
            ))),
        }
    }
}

/// Reddit API credentials. Immutable after construction; the presence of
/// `username`/`password` determines whether write operations are possible.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// True when a token exchange can be attempted at all.
    pub fn has_client_credentials(&self) -> bool {
        matches!((&self.client_id, &self.client_secret), (Some(id), Some(secret))
            if !id.is_empty() && !secret.is_empty())
    }

    /// True when the password grant (and therefore writes) is available.
    pub fn has_user_credentials(&self) -> bool {
        matches!((&self.username, &self.password), (Some(u), Some(p))
            if !u.is_empty() && !p.is_empty())
    }
}

/// Write-protection settings for mutating operations.
#[derive(Debug, Clone)]
pub struct SafeModeConfig {
    pub enabled: bool,
    pub write_delay_ms: u64,
    pub duplicate_check: bool,
    pub max_recent_hashes: usize,
}

impl Default for SafeModeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            write_delay_ms: 5000,
            duplicate_check: true,
            max_recent_hashes: 50,
        }
    }
}

/// Application configuration derived from environment variables and .env file
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: String,
    pub auth_mode: AuthMode,
    pub secret_provider: SecretProvider,
    pub safe_mode: SafeModeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            user_agent: format!("redditkit/{}", env!("CARGO_PKG_VERSION")),
            auth_mode: AuthMode::Auto,
            secret_provider: SecretProvider::Env,
            safe_mode: SafeModeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn load() -> Result<Self> {
        // Try to load .env file, but continue even if it doesn't exist
        match dotenv() {
            Ok(_) => info!("Loaded environment from .env file"),
            Err(_) => info!("No .env file found, using system environment variables only"),
        }

        let mut config = Self::default();

        if let Ok(client_id) = env::var("REDDIT_CLIENT_ID") {
            config.client_id = Some(client_id);
        }

        if let Ok(client_secret) = env::var("REDDIT_CLIENT_SECRET") {
            config.client_secret = Some(client_secret);
        }

        if let Ok(username) = env::var("REDDIT_USERNAME") {
            config.username = Some(username);
        }

        if let Ok(password) = env::var("REDDIT_PASSWORD") {
            config.password = Some(password);
        }

        if let Ok(user_agent) = env::var("REDDIT_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(mode) = env::var("REDDIT_AUTH_MODE") {
            config.auth_mode = mode.parse()?;
        }

        if let Ok(provider) = env::var("REDDIT_SECRET_PROVIDER") {
            config.secret_provider = provider.parse()?;
        }

        if let Ok(enabled) = env::var("REDDIT_SAFE_MODE") {
            config.safe_mode.enabled = enabled != "0" && !enabled.eq_ignore_ascii_case("false");
        }

        if let Ok(delay_str) = env::var("REDDIT_WRITE_DELAY_MS") {
            if let Ok(delay) = delay_str.parse::<u64>() {
                config.safe_mode.write_delay_ms = delay;
            }
        }

        if let Ok(check) = env::var("REDDIT_DUPLICATE_CHECK") {
            config.safe_mode.duplicate_check = check != "0" && !check.eq_ignore_ascii_case("false");
        }

        if let Ok(max_str) = env::var("REDDIT_MAX_RECENT_HASHES") {
            if let Ok(max) = max_str.parse::<usize>() {
                config.safe_mode.max_recent_hashes = max;
            }
        }

        Ok(config)
    }

    /// Fill in secrets that the environment did not provide.
    pub fn apply_secrets(&mut self, secrets: crate::secrets::ResolvedSecrets) {
        if self.client_secret.is_none() {
            self.client_secret = secrets.client_secret;
        }
        if self.password.is_none() {
            self.password = secrets.password;
        }
    }

    /// Snapshot the credential fields for client construction.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            user_agent: self.user_agent.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
