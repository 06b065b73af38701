//! Write-path safety: access validation, a global inter-write delay and
//! duplicate-content rejection.
//!
//! The guard is advisory spam-avoidance, not a correctness boundary.
//! Concurrent writers can interleave around `last_write` so the throttle may
//! under-delay under contention; that race is accepted.

use crate::config::{AuthMode, Credentials, SafeModeConfig};
use crate::error::{RedditError, Result};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

type ContentDigest = [u8; 32];

#[derive(Debug, Default)]
struct GuardState {
    last_write: Option<Instant>,
    // insertion-ordered; membership means "seen within the last
    // max_recent_hashes accepted writes", not within any time window
    recent_hashes: VecDeque<ContentDigest>,
}

pub struct WriteGuard {
    config: SafeModeConfig,
    state: Mutex<GuardState>,
}

impl WriteGuard {
    pub fn new(config: SafeModeConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GuardState::default()),
        }
    }

    /// Fail unless the configured identity can write at all. The message
    /// distinguishes anonymous mode from missing credentials because the
    /// remediation differs.
    pub fn validate_write_access(&self, mode: AuthMode, credentials: &Credentials) -> Result<()> {
        if mode == AuthMode::Anonymous {
            return Err(RedditError::Auth(
                "write operations are unavailable in anonymous mode".to_string(),
            ));
        }
        if !credentials.has_user_credentials() {
            return Err(RedditError::Auth(
                "write operations require a username and password; set REDDIT_USERNAME and REDDIT_PASSWORD".to_string(),
            ));
        }
        Ok(())
    }

    /// Reject content already seen among the last `max_recent_hashes`
    /// accepted writes. Matching is over the trimmed, lowercased text, so
    /// case- or whitespace-only variations still count as duplicates.
    /// Eviction is strict FIFO: re-seeing a hash does not refresh its slot.
    pub fn check_duplicate(&self, content: &str) -> Result<()> {
        if !self.config.enabled || !self.config.duplicate_check {
            return Ok(());
        }

        let digest = content_digest(content);
        let mut state = self.state.lock().unwrap();

        if state.recent_hashes.contains(&digest) {
            return Err(RedditError::DuplicateContent(
                "identical content was submitted recently".to_string(),
            ));
        }

        state.recent_hashes.push_back(digest);
        while state.recent_hashes.len() > self.config.max_recent_hashes {
            state.recent_hashes.pop_front();
        }
        Ok(())
    }

    /// Enforce the minimum inter-write delay, sleeping off whatever remains
    /// of the window. Single global throttle, not per-resource.
    pub async fn wait_for_write_slot(&self) {
        if !self.config.enabled || self.config.write_delay_ms == 0 {
            return;
        }

        let delay = Duration::from_millis(self.config.write_delay_ms);
        let remaining = {
            let state = self.state.lock().unwrap();
            state
                .last_write
                .map(|last| delay.saturating_sub(last.elapsed()))
                .unwrap_or(Duration::ZERO)
        };

        if !remaining.is_zero() {
            debug!("write throttle: waiting {:?}", remaining);
            tokio::time::sleep(remaining).await;
        }

        self.state.lock().unwrap().last_write = Some(Instant::now());
    }
}

fn content_digest(content: &str) -> ContentDigest {
    let normalized = content.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(max_recent_hashes: usize, write_delay_ms: u64) -> WriteGuard {
        WriteGuard::new(SafeModeConfig {
            enabled: true,
            write_delay_ms,
            duplicate_check: true,
            max_recent_hashes,
        })
    }

    fn writable_credentials() -> Credentials {
        Credentials {
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            user_agent: "test".into(),
            username: Some("bot".into()),
            password: Some("hunter2".into()),
        }
    }

    #[test]
    fn anonymous_mode_is_rejected_with_distinct_message() {
        let guard = guard(10, 0);
        let err = guard
            .validate_write_access(AuthMode::Anonymous, &writable_credentials())
            .unwrap_err();
        assert!(err.to_string().contains("anonymous mode"));

        let mut creds = writable_credentials();
        creds.password = None;
        let err = guard
            .validate_write_access(AuthMode::Auto, &creds)
            .unwrap_err();
        assert!(err.to_string().contains("username and password"));
    }

    #[test]
    fn duplicate_detection_is_case_and_whitespace_insensitive() {
        let guard = guard(10, 0);
        guard.check_duplicate("Hello World").unwrap();
        assert!(matches!(
            guard.check_duplicate("  hello world  "),
            Err(RedditError::DuplicateContent(_))
        ));
        assert!(matches!(
            guard.check_duplicate("HELLO WORLD"),
            Err(RedditError::DuplicateContent(_))
        ));
        guard.check_duplicate("different content").unwrap();
    }

    #[test]
    fn eviction_is_strict_fifo() {
        let guard = guard(2, 0);
        guard.check_duplicate("A").unwrap();
        guard.check_duplicate("B").unwrap();
        guard.check_duplicate("C").unwrap(); // evicts A

        assert!(guard.check_duplicate("A").is_ok()); // A was evicted
        assert!(guard.check_duplicate("C").is_err()); // C still present
    }

    #[test]
    fn disabled_safe_mode_skips_duplicate_check() {
        let guard = WriteGuard::new(SafeModeConfig {
            enabled: false,
            write_delay_ms: 1000,
            duplicate_check: true,
            max_recent_hashes: 10,
        });
        guard.check_duplicate("same").unwrap();
        guard.check_duplicate("same").unwrap();
    }

    #[tokio::test]
    async fn second_write_waits_out_the_delay() {
        let guard = guard(10, 50);
        let start = Instant::now();
        guard.wait_for_write_slot().await; // first write: no wait
        assert!(start.elapsed() < Duration::from_millis(40));
        guard.wait_for_write_slot().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn zero_delay_never_sleeps() {
        let guard = guard(10, 0);
        let start = Instant::now();
        guard.wait_for_write_slot().await;
        guard.wait_for_write_slot().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
