//! The public operation set, implemented as methods on
//! [`RedditClient`](crate::client::RedditClient). Read operations sanitize
//! identifiers, dispatch a GET and map the payload into domain entities;
//! write operations run through the write guard first.

mod read;
mod write;

pub use write::VoteDirection;
