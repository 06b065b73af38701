//! Identifier validation and thing-id normalization.
//!
//! Every caller-supplied username, subreddit name or post id passes through
//! [`sanitize_segment`] before it is interpolated into a request path. This
//! is the sole defense against path/query injection into the upstream API.

use crate::error::{RedditError, Result};

const MAX_SEGMENT_LEN: usize = 100;

/// Reddit's type-prefix convention for fullnames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingKind {
    Post,
    Comment,
}

impl ThingKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ThingKind::Post => "t3_",
            ThingKind::Comment => "t1_",
        }
    }
}

/// Validate an untrusted identifier and return a percent-encoded path
/// segment.
///
/// Accepts only `^[A-Za-z0-9_][A-Za-z0-9_.-]{0,99}$`: non-empty, starts with
/// a word character, at most 100 characters, no path separators and no `..`.
pub fn sanitize_segment(value: &str, label: &str) -> Result<String> {
    if value.is_empty() {
        return Err(RedditError::validation(label, "must not be empty"));
    }
    if value.len() > MAX_SEGMENT_LEN {
        return Err(RedditError::validation(
            label,
            format!("must be at most {} characters", MAX_SEGMENT_LEN),
        ));
    }

    let mut chars = value.chars();
    let first = chars.next().unwrap_or_default();
    if !(first.is_ascii_alphanumeric() || first == '_') {
        return Err(RedditError::validation(
            label,
            "must start with a letter, digit or underscore",
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(RedditError::validation(
            label,
            "may only contain letters, digits, '_', '.' and '-'",
        ));
    }

    Ok(urlencoding::encode(value).into_owned())
}

/// Prepend the canonical prefix for `kind` unless the id already carries a
/// thing prefix. A caller-supplied id is trusted to declare its own kind,
/// so an existing `t1_`/`t3_` prefix wins regardless of the requested kind.
pub fn ensure_thing_id(id: &str, kind: ThingKind) -> String {
    if id.starts_with("t1_") || id.starts_with("t3_") {
        id.to_string()
    } else {
        format!("{}{}", kind.prefix(), id)
    }
}

/// True when the id refers to a comment (`t1_` prefix).
pub fn is_comment_id(id: &str) -> bool {
    id.starts_with("t1_")
}

/// Strip a thing prefix, if present, yielding the bare id used by
/// path-based endpoints like `/comments/{id}`.
pub fn bare_id(id: &str) -> &str {
    id.strip_prefix("t1_")
        .or_else(|| id.strip_prefix("t3_"))
        .unwrap_or(id)
}
