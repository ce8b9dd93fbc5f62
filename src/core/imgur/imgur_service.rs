// Read-only questions about Imgur posts. The service owns the client and keeps the
// commands free of any knowledge about how comments or tags are fetched.

use crate::core::comments::contains_identifier;

use super::imgur_models::{validate_imgur_id, ImgurClient, ImgurError};
use super::rating::Rating;

pub struct ImgurService<C: ImgurClient> {
    client: C,
}

impl<C: ImgurClient> ImgurService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    fn validate_post_id(post_id: &str) -> Result<&str, ImgurError> {
        validate_imgur_id("post id", post_id)
    }

    /// Is `comment_id` anywhere in the comment tree of `post_id`?
    pub async fn contains_comment(&self, post_id: &str, comment_id: u64) -> Result<bool, ImgurError> {
        let post_id = Self::validate_post_id(post_id)?;
        let forest = self.client.get_comments(post_id).await?;

        tracing::debug!(post_id, comment_id, roots = forest.len(), "Searching comment tree");
        Ok(contains_identifier(&forest, comment_id))
    }

    pub async fn post_rating(&self, post_id: &str) -> Result<Rating, ImgurError> {
        let post_id = Self::validate_post_id(post_id)?;
        let post = self.client.get_post(post_id).await?;
        let rating = Rating::classify(post.nsfw, &post.tags);

        tracing::debug!(post_id = %post.id, %rating, tags = post.tags.len(), "Rated post");
        Ok(rating)
    }
}
