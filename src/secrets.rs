//! Secret resolution seam.
//!
//! The client core only ever sees [`ResolvedSecrets`]; how a secret is
//! fetched (environment, `git credential`, `pass`) stays behind this
//! interface.

use crate::config::SecretProvider;
use crate::error::{RedditError, Result};
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Secrets a provider was able to supply; missing values stay `None` and the
/// caller decides whether that is fatal.
#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub client_secret: Option<String>,
    pub password: Option<String>,
}

#[async_trait]
pub trait SecretsResolver: Send + Sync {
    async fn resolve(&self, username: Option<&str>) -> Result<ResolvedSecrets>;
}

/// Build the resolver selected by configuration.
pub fn resolver_for(provider: SecretProvider) -> Box<dyn SecretsResolver> {
    match provider {
        SecretProvider::Env => Box::new(EnvSecrets),
        SecretProvider::GitCredential => Box::new(GitCredentialSecrets),
        SecretProvider::PassCli => Box::new(PassCliSecrets),
    }
}

/// Reads `REDDIT_CLIENT_SECRET` / `REDDIT_PASSWORD` from the environment.
pub struct EnvSecrets;

#[async_trait]
impl SecretsResolver for EnvSecrets {
    async fn resolve(&self, _username: Option<&str>) -> Result<ResolvedSecrets> {
        Ok(ResolvedSecrets {
            client_secret: std::env::var("REDDIT_CLIENT_SECRET").ok(),
            password: std::env::var("REDDIT_PASSWORD").ok(),
        })
    }
}

/// Asks `git credential fill` for the password stored against reddit.com.
pub struct GitCredentialSecrets;

#[async_trait]
impl SecretsResolver for GitCredentialSecrets {
    async fn resolve(&self, username: Option<&str>) -> Result<ResolvedSecrets> {
        let username = username.ok_or_else(|| {
            RedditError::Config("git-credential provider requires REDDIT_USERNAME".to_string())
        })?;

        let mut child = Command::new("git")
            .args(["credential", "fill"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RedditError::Config(format!("failed to run git credential: {}", e)))?;

        let request = format!("protocol=https\nhost=reddit.com\nusername={}\n\n", username);
        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(request.as_bytes())
                .await
                .map_err(|e| RedditError::Config(format!("git credential stdin: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RedditError::Config(format!("git credential: {}", e)))?;
        if !output.status.success() {
            return Err(RedditError::Config(
                "git credential fill returned no entry for reddit.com".to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let password = stdout
            .lines()
            .find_map(|line| line.strip_prefix("password="))
            .map(str::to_string);
        debug!("git-credential lookup for {}: found={}", username, password.is_some());

        Ok(ResolvedSecrets {
            client_secret: std::env::var("REDDIT_CLIENT_SECRET").ok(),
            password,
        })
    }
}

/// Reads `pass show reddit/<username>`; first line is the password.
pub struct PassCliSecrets;

#[async_trait]
impl SecretsResolver for PassCliSecrets {
    async fn resolve(&self, username: Option<&str>) -> Result<ResolvedSecrets> {
        let username = username.ok_or_else(|| {
            RedditError::Config("pass-cli provider requires REDDIT_USERNAME".to_string())
        })?;

        let output = Command::new("pass")
            .args(["show", &format!("reddit/{}", username)])
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| RedditError::Config(format!("failed to run pass: {}", e)))?;
        if !output.status.success() {
            return Err(RedditError::Config(format!(
                "pass has no entry for reddit/{}",
                username
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let password = stdout.lines().next().map(str::to_string);

        Ok(ResolvedSecrets {
            client_secret: std::env::var("REDDIT_CLIENT_SECRET").ok(),
            password,
        })
    }
}
