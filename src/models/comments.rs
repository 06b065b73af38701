//! Comment listing wire types and the tree flattener.
//!
//! Reddit nests replies recursively: each comment optionally carries a
//! `replies` field that is either an empty string or another listing of the
//! same shape. The flattener walks that structure with an explicit work
//! stack, so pathologically deep threads cannot exhaust the call stack, and
//! emits a depth-annotated sequence in Reddit's reading order (each subtree
//! before the next sibling).

use crate::models::edited_flag;
use serde::{Deserialize, Deserializer};

/// Depth cap for adversarially nested threads; children beyond it are
/// dropped.
pub const MAX_COMMENT_DEPTH: u32 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct CommentListing {
    #[serde(default)]
    pub data: CommentListingData,
}

#[derive(Deserialize, Debug, Default)]
pub struct CommentListingData {
    #[serde(default)]
    pub children: Vec<CommentThing>,
}

#[derive(Deserialize, Debug)]
pub struct CommentThing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: RawComment,
}

#[derive(Deserialize, Debug, Default)]
pub struct RawComment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub is_submitter: bool,
    #[serde(default)]
    pub edited: serde_json::Value,
    #[serde(default, deserialize_with = "replies_or_empty")]
    pub replies: Option<CommentListing>,
}

/// `replies` is `""` on leaf comments and a listing object otherwise.
fn replies_or_empty<'de, D>(deserializer: D) -> Result<Option<CommentListing>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// A comment flattened out of the reply tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    /// Recursion depth from the post root; direct replies to the post are 0.
    pub depth: u32,
    /// Fullname of the immediate parent as reported by the API, not
    /// recomputed from tree position.
    pub parent_id: String,
    pub created_utc: f64,
    pub is_submitter: bool,
    pub edited: bool,
}

/// Flatten the recursive reply structure into a pre-order, depth-annotated
/// sequence.
///
/// Non-comment kinds (`more`, listings of collapsed children) and bodyless
/// deleted/removed placeholders are dropped rather than emitted as empty
/// entries. Each subtree is visited before the next sibling, preserving the
/// indentation order callers render.
pub fn flatten_comment_tree(listing: CommentListing) -> Vec<CommentNode> {
    let mut flattened = Vec::new();
    let mut stack: Vec<(u32, CommentThing)> = listing
        .data
        .children
        .into_iter()
        .rev()
        .map(|child| (0, child))
        .collect();

    while let Some((depth, thing)) = stack.pop() {
        if thing.kind != "t1" {
            continue;
        }
        let mut data = thing.data;
        let replies = data.replies.take();
        if data.body.trim().is_empty() {
            // deleted/removed placeholder
            continue;
        }

        flattened.push(CommentNode {
            id: data.id,
            author: data.author,
            body: data.body,
            score: data.score,
            depth,
            parent_id: data.parent_id,
            created_utc: data.created_utc,
            is_submitter: data.is_submitter,
            edited: edited_flag(&data.edited),
        });

        if depth < MAX_COMMENT_DEPTH {
            if let Some(replies) = replies {
                // reversed so the first child pops before its siblings
                for child in replies.data.children.into_iter().rev() {
                    stack.push((depth + 1, child));
                }
            }
        }
    }

    flattened
}
