//! redditkit: a Reddit REST API client with token lifecycle management,
//! transparent re-authentication, and write-path safety guards.
//!
//! Construct an [`AppConfig`], build one [`RedditClient`] per process, and
//! call the read/write operations on it. Write operations are gated by
//! [`client::guard::WriteGuard`]: credential validation, a global
//! inter-write delay, and duplicate-content rejection, in that order of
//! failure precedence.

pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod operations;
pub mod secrets;

pub use client::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use client::RedditClient;
pub use config::{AppConfig, AuthMode, Credentials, SafeModeConfig, SecretProvider};
pub use error::{RedditError, Result};
pub use models::comments::{flatten_comment_tree, CommentNode};
pub use models::{Post, SubmitOutcome, Subreddit, User};
pub use operations::VoteDirection;
