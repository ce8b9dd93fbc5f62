use async_trait::async_trait;
use thiserror::Error;

use crate::core::comments::CommentNode;

/// Errors coming back from Imgur.
///
/// Classification is by HTTP status only. The client maps a response to one of
/// these the moment it arrives, so nothing further up ever looks at message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImgurError {
    #[error("Imgur rejected the request for {0}")]
    BadRequest(String),
    #[error("Imgur could not find {0}")]
    NotFound(String),
    #[error("Imgur rate limit hit, try again later")]
    RateLimited,
    #[error("Imgur returned {status} for {context}")]
    Status { status: u16, context: String },
    #[error("Could not reach Imgur: {0}")]
    Transport(String),
    #[error("Unexpected response from Imgur: {0}")]
    Decode(String),
}

impl ImgurError {
    /// Map a non-success status code to an error. `context` names what was
    /// being fetched, e.g. `account foo`.
    pub fn from_status(status: u16, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            400 => ImgurError::BadRequest(context),
            404 => ImgurError::NotFound(context),
            429 => ImgurError::RateLimited,
            _ => ImgurError::Status { status, context },
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, ImgurError::BadRequest(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ImgurError::NotFound(_))
    }
}

/// Trim and check a user-supplied post id or account name before it goes
/// anywhere near a URL. Imgur ids are ASCII letters, digits, `_` and `-`.
pub fn validate_imgur_id<'a>(kind: &str, raw: &'a str) -> Result<&'a str, ImgurError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ImgurError::BadRequest(format!("an empty {kind}")));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ImgurError::BadRequest(format!("{kind} `{id}`")));
    }
    Ok(id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgurAccount {
    pub id: u64,
    pub name: String,
}

/// A gallery post, reduced to what rating classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImgurPost {
    pub id: String,
    pub nsfw: bool,
    pub tags: Vec<String>,
}

/// The Imgur calls the core needs. Implemented over HTTP in `infra`.
#[async_trait]
pub trait ImgurClient: Send + Sync {
    async fn get_account(&self, username: &str) -> Result<ImgurAccount, ImgurError>;
    async fn get_post(&self, post_id: &str) -> Result<ImgurPost, ImgurError>;
    /// Top-level comments of a post, with replies nested under them.
    async fn get_comments(&self, post_id: &str) -> Result<Vec<CommentNode>, ImgurError>;
}
