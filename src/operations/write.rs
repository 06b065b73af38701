use crate::client::RedditClient;
use crate::error::{RedditError, Result};
use crate::ident::{ensure_thing_id, is_comment_id, sanitize_segment, ThingKind};
use crate::models::SubmitOutcome;
use log::info;

/// Vote direction for [`RedditClient::vote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
    /// Rescind a previous vote.
    Clear,
}

impl VoteDirection {
    fn dir(self) -> &'static str {
        match self {
            VoteDirection::Up => "1",
            VoteDirection::Down => "-1",
            VoteDirection::Clear => "0",
        }
    }
}

impl RedditClient {
    /// Submit a self post. Runs the full write gate before touching the
    /// network; the duplicate window covers title and body together.
    pub async fn create_post(
        &self,
        subreddit: &str,
        title: &str,
        text: &str,
    ) -> Result<SubmitOutcome> {
        sanitize_segment(subreddit, "subreddit")?;
        if title.trim().is_empty() {
            return Err(RedditError::validation("title", "must not be empty"));
        }
        self.guard_write(Some(&format!("{}\n{}", title, text)))
            .await?;

        info!("submitting post to r/{}: {}", subreddit, title);
        let json = self
            .post_form(
                "/api/submit",
                vec![
                    ("api_type".to_string(), "json".to_string()),
                    ("sr".to_string(), subreddit.to_string()),
                    ("kind".to_string(), "self".to_string()),
                    ("title".to_string(), title.to_string()),
                    ("text".to_string(), text.to_string()),
                ],
            )
            .await?;

        Ok(SubmitOutcome::from_envelope(&json))
    }

    /// Reply to a post or comment. Bare ids are taken to name posts; a
    /// `t1_`/`t3_` prefix on the caller's id wins.
    ///
    /// Post targets get an existence pre-check so a deleted target produces
    /// a `NotFound` instead of the API's generic 400. Comment targets skip
    /// the pre-check.
    pub async fn reply_to_post(&self, parent_id: &str, text: &str) -> Result<SubmitOutcome> {
        if text.trim().is_empty() {
            return Err(RedditError::validation("text", "must not be empty"));
        }
        self.guard_write(Some(text)).await?;

        let thing_id = ensure_thing_id(parent_id, ThingKind::Post);
        if !is_comment_id(&thing_id) {
            self.get_post(&thing_id).await.map_err(|err| match err {
                RedditError::NotFound(_) | RedditError::Upstream { status: 404, .. } => {
                    RedditError::NotFound(format!(
                        "cannot reply: post {} does not exist or was deleted",
                        thing_id
                    ))
                }
                other => other,
            })?;
        }

        info!("replying to {}", thing_id);
        let json = self
            .post_form(
                "/api/comment",
                vec![
                    ("api_type".to_string(), "json".to_string()),
                    ("thing_id".to_string(), thing_id),
                    ("text".to_string(), text.to_string()),
                ],
            )
            .await?;

        Ok(SubmitOutcome::from_envelope(&json))
    }

    /// Replace the body of one of our posts.
    pub async fn edit_post(&self, post_id: &str, text: &str) -> Result<SubmitOutcome> {
        self.edit_thing(ensure_thing_id(post_id, ThingKind::Post), text)
            .await
    }

    /// Replace the body of one of our comments.
    pub async fn edit_comment(&self, comment_id: &str, text: &str) -> Result<SubmitOutcome> {
        self.edit_thing(ensure_thing_id(comment_id, ThingKind::Comment), text)
            .await
    }

    async fn edit_thing(&self, thing_id: String, text: &str) -> Result<SubmitOutcome> {
        if text.trim().is_empty() {
            return Err(RedditError::validation("text", "must not be empty"));
        }
        self.guard_write(Some(text)).await?;

        info!("editing {}", thing_id);
        let json = self
            .post_form(
                "/api/editusertext",
                vec![
                    ("api_type".to_string(), "json".to_string()),
                    ("thing_id".to_string(), thing_id),
                    ("text".to_string(), text.to_string()),
                ],
            )
            .await?;

        Ok(SubmitOutcome::from_envelope(&json))
    }

    /// Delete one of our posts.
    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.delete_thing(ensure_thing_id(post_id, ThingKind::Post))
            .await
    }

    /// Delete one of our comments.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<()> {
        self.delete_thing(ensure_thing_id(comment_id, ThingKind::Comment))
            .await
    }

    async fn delete_thing(&self, thing_id: String) -> Result<()> {
        // deletion has no content to hash, so only access and rate checks
        self.guard_write(None).await?;

        info!("deleting {}", thing_id);
        self.post_form("/api/del", vec![("id".to_string(), thing_id)])
            .await?;
        Ok(())
    }

    /// Vote on a post or comment. Bare ids are taken to name posts.
    pub async fn vote(&self, thing_id: &str, direction: VoteDirection) -> Result<()> {
        self.guard_write(None).await?;

        let id = ensure_thing_id(thing_id, ThingKind::Post);
        info!("voting {} on {}", direction.dir(), id);
        self.post_form(
            "/api/vote",
            vec![
                ("id".to_string(), id),
                ("dir".to_string(), direction.dir().to_string()),
            ],
        )
        .await?;
        Ok(())
    }
}
