use crate::client::RedditClient;
use crate::error::{RedditError, Result};
use crate::ident::{bare_id, ensure_thing_id, sanitize_segment, ThingKind};
use crate::models::comments::{flatten_comment_tree, CommentListing, CommentNode};
use crate::models::{Listing, Post, RawPost, RawSubreddit, RawUser, Subreddit, Thing, User};
use log::info;

const TOP_PERIODS: [&str; 6] = ["hour", "day", "week", "month", "year", "all"];

fn validate_period(period: &str) -> Result<()> {
    if TOP_PERIODS.contains(&period) {
        Ok(())
    } else {
        Err(RedditError::validation(
            "period",
            format!("must be one of {}", TOP_PERIODS.join(", ")),
        ))
    }
}

fn posts_from_listing(value: serde_json::Value) -> Result<Vec<Post>> {
    let listing: Listing<RawPost> = serde_json::from_value(value)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter(|child| child.kind == "t3")
        .map(|child| Post::from(child.data))
        .collect())
}

impl RedditClient {
    /// Fetch a user's profile.
    pub async fn get_user(&self, username: &str) -> Result<User> {
        let segment = sanitize_segment(username, "username")?;
        let value = self
            .get_json(&format!("/user/{}/about.json", segment), &[])
            .await?;
        let thing: Thing<RawUser> = serde_json::from_value(value)?;
        Ok(User::from(thing.data))
    }

    /// Fetch a single post by id (bare or `t3_`-prefixed).
    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        sanitize_segment(bare_id(post_id), "post id")?;
        let fullname = ensure_thing_id(bare_id(post_id), ThingKind::Post);
        let value = self
            .get_json("/api/info.json", &[("id", fullname.clone())])
            .await?;
        posts_from_listing(value)?
            .into_iter()
            .next()
            .ok_or_else(|| RedditError::NotFound(format!("post {}", fullname)))
    }

    /// Fetch metadata about a subreddit.
    pub async fn get_subreddit_info(&self, subreddit: &str) -> Result<Subreddit> {
        let segment = sanitize_segment(subreddit, "subreddit")?;
        let value = self
            .get_json(&format!("/r/{}/about.json", segment), &[])
            .await?;
        let thing: Thing<RawSubreddit> = serde_json::from_value(value)?;
        Ok(Subreddit::from(thing.data))
    }

    /// Top posts in a subreddit over `period` (hour, day, week, month, year
    /// or all).
    pub async fn get_top_posts(&self, subreddit: &str, period: &str, limit: u32) -> Result<Vec<Post>> {
        validate_period(period)?;
        let segment = sanitize_segment(subreddit, "subreddit")?;
        info!("fetching top {} posts from r/{} ({})", limit, subreddit, period);
        let value = self
            .get_json(
                &format!("/r/{}/top.json", segment),
                &[("t", period.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        posts_from_listing(value)
    }

    /// Search sitewide, or within one subreddit when `subreddit` is given.
    pub async fn search_reddit(
        &self,
        query: &str,
        subreddit: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Post>> {
        if query.trim().is_empty() {
            return Err(RedditError::validation("query", "must not be empty"));
        }

        let (path, restrict): (String, bool) = match subreddit {
            Some(sub) => {
                let segment = sanitize_segment(sub, "subreddit")?;
                (format!("/r/{}/search.json", segment), true)
            }
            None => ("/search.json".to_string(), false),
        };

        let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
        if restrict {
            params.push(("restrict_sr", "1".to_string()));
        }

        let value = self.get_json(&path, &params).await?;
        posts_from_listing(value)
    }

    /// A user's submitted posts, newest first.
    pub async fn get_user_posts(&self, username: &str, limit: u32) -> Result<Vec<Post>> {
        let segment = sanitize_segment(username, "username")?;
        let value = self
            .get_json(
                &format!("/user/{}/submitted.json", segment),
                &[("limit", limit.to_string())],
            )
            .await?;
        posts_from_listing(value)
    }

    /// A user's comments, newest first. The listing is flat, so every node
    /// comes back at depth 0.
    pub async fn get_user_comments(&self, username: &str, limit: u32) -> Result<Vec<CommentNode>> {
        let segment = sanitize_segment(username, "username")?;
        let value = self
            .get_json(
                &format!("/user/{}/comments.json", segment),
                &[("limit", limit.to_string())],
            )
            .await?;
        let listing: CommentListing = serde_json::from_value(value)?;
        Ok(flatten_comment_tree(listing))
    }

    /// The post plus its comment tree flattened into reading order.
    pub async fn get_post_comments(
        &self,
        post_id: &str,
        limit: u32,
    ) -> Result<(Post, Vec<CommentNode>)> {
        let id = bare_id(post_id);
        let segment = sanitize_segment(id, "post id")?;
        let value = self
            .get_json(
                &format!("/comments/{}.json", segment),
                &[("limit", limit.to_string())],
            )
            .await?;

        // the endpoint returns a two-element array: the post listing, then
        // the comment listing
        let mut parts = match value {
            serde_json::Value::Array(parts) if parts.len() >= 2 => parts,
            _ => {
                return Err(RedditError::NotFound(format!("post {}", post_id)));
            }
        };

        let comment_value = parts.remove(1);
        let post_value = parts.remove(0);

        let post = posts_from_listing(post_value)?
            .into_iter()
            .next()
            .ok_or_else(|| RedditError::NotFound(format!("post {}", post_id)))?;
        let listing: CommentListing = serde_json::from_value(comment_value)?;

        Ok((post, flatten_comment_tree(listing)))
    }

    /// Currently popular subreddits.
    pub async fn get_trending_subreddits(&self, limit: u32) -> Result<Vec<Subreddit>> {
        let value = self
            .get_json(
                "/subreddits/popular.json",
                &[("limit", limit.to_string())],
            )
            .await?;
        let listing: Listing<RawSubreddit> = serde_json::from_value(value)?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| Subreddit::from(child.data))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_validation() {
        for period in TOP_PERIODS {
            assert!(validate_period(period).is_ok());
        }
        assert!(validate_period("fortnight").is_err());
        assert!(validate_period("").is_err());
    }

    #[test]
    fn listing_mapping_skips_non_post_kinds() {
        let value = serde_json::json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t3", "data": {"id": "a", "title": "keep"}},
                {"kind": "t5", "data": {"id": "b"}}
            ]}
        });
        let posts = posts_from_listing(value).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "a");
    }
}
