//! Wire-format structs and the domain entities they map into.
//!
//! Raw structs mirror Reddit's snake_case JSON exactly; each domain entity
//! has one explicit mapping function so every field rename is spelled out
//! and testable. Entities are created from a response and discarded after
//! use; nothing is cached.

pub mod comments;

use serde::Deserialize;

/// Reddit's conventional `kind` + `data` envelope.
#[derive(Deserialize, Debug)]
pub struct Thing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

/// A paginated listing of things.
#[derive(Deserialize, Debug)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Deserialize, Debug)]
pub struct ListingData<T> {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

/// `edited` comes back as `false` or an edit timestamp.
pub(crate) fn edited_flag(value: &serde_json::Value) -> bool {
    value.as_f64().is_some() || value.as_bool() == Some(true)
}

// ---------------------------------------------------------------------------
// Users

#[derive(Deserialize, Debug, Default)]
pub struct RawUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub is_gold: bool,
    #[serde(default)]
    pub is_mod: bool,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub comment_karma: i64,
    pub link_karma: i64,
    pub created_utc: f64,
    pub is_gold: bool,
    pub is_mod: bool,
    pub verified: bool,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            id: raw.id,
            name: raw.name,
            comment_karma: raw.comment_karma,
            link_karma: raw.link_karma,
            created_utc: raw.created_utc,
            is_gold: raw.is_gold,
            is_mod: raw.is_mod,
            verified: raw.verified,
        }
    }
}

// ---------------------------------------------------------------------------
// Posts

#[derive(Deserialize, Debug, Default)]
pub struct RawPost {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: f32,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub edited: serde_json::Value,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    /// Fullname (`t3_`-prefixed id) as reported by the API.
    pub name: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub selftext: String,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub upvote_ratio: f32,
    pub num_comments: i64,
    pub created_utc: f64,
    pub nsfw: bool,
    pub stickied: bool,
    pub is_self: bool,
    pub edited: bool,
    pub flair: Option<String>,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        let edited = edited_flag(&raw.edited);
        Post {
            id: raw.id,
            name: raw.name,
            title: raw.title,
            author: raw.author,
            subreddit: raw.subreddit,
            selftext: raw.selftext,
            url: raw.url,
            permalink: raw.permalink,
            score: raw.score,
            upvote_ratio: raw.upvote_ratio,
            num_comments: raw.num_comments,
            created_utc: raw.created_utc,
            nsfw: raw.over_18,
            stickied: raw.stickied,
            is_self: raw.is_self,
            edited,
            flair: raw.link_flair_text,
        }
    }
}

impl Post {
    /// One-line summary for CLI display.
    pub fn format_summary(&self) -> String {
        format!(
            "[r/{} | {} pts | {} comments] {} - by u/{}",
            self.subreddit, self.score, self.num_comments, self.title, self.author
        )
    }

    pub fn format_timestamp(&self) -> String {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_opt(self.created_utc as i64, 0)
            .single()
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Subreddits

#[derive(Deserialize, Debug, Default)]
pub struct RawSubreddit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub public_description: String,
    #[serde(default)]
    pub subscribers: i64,
    #[serde(default)]
    pub active_user_count: Option<i64>,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub over18: bool,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subreddit {
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub subscribers: i64,
    pub active_users: Option<i64>,
    pub created_utc: f64,
    pub nsfw: bool,
    pub url: String,
}

impl From<RawSubreddit> for Subreddit {
    fn from(raw: RawSubreddit) -> Self {
        Subreddit {
            id: raw.id,
            name: raw.display_name,
            title: raw.title,
            description: raw.public_description,
            subscribers: raw.subscribers,
            active_users: raw.active_user_count,
            created_utc: raw.created_utc,
            nsfw: raw.over18,
            url: raw.url,
        }
    }
}

// ---------------------------------------------------------------------------
// Write results

/// Outcome of a submit/comment call, extracted from the success envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOutcome {
    /// Fullname of the created thing, when the API reports one.
    pub name: Option<String>,
    /// Permalink or URL of the created thing, when the API reports one.
    pub url: Option<String>,
}

impl SubmitOutcome {
    pub fn from_envelope(json: &serde_json::Value) -> Self {
        let data = &json["json"]["data"];
        let name = data["name"]
            .as_str()
            .or_else(|| data["things"][0]["data"]["name"].as_str())
            .map(str::to_string);
        let url = data["url"]
            .as_str()
            .or_else(|| data["things"][0]["data"]["permalink"].as_str())
            .map(str::to_string);
        SubmitOutcome { name, url }
    }
}
