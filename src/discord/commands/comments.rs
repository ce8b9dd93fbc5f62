// Prefix commands that answer questions about Imgur posts.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::commands::{BotCommand, CommandContext, CommandError, CommandReply};
use crate::core::imgur::{ImgurClient, ImgurService};

/// `findcomment <post id> <comment id>` - is the comment anywhere in the post's thread?
pub struct FindCommentCommand<C: ImgurClient> {
    imgur: Arc<ImgurService<C>>,
}

impl<C: ImgurClient> FindCommentCommand<C> {
    pub fn new(imgur: Arc<ImgurService<C>>) -> Self {
        Self { imgur }
    }
}

#[async_trait]
impl<C: ImgurClient> BotCommand for FindCommentCommand<C> {
    async fn execute(
        &self,
        _ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let [post_id, comment_arg] = args else {
            return Err(CommandError::Usage(
                "expected a post id and a comment id".to_string(),
            ));
        };
        let comment_id: u64 = comment_arg.parse().map_err(|_| {
            CommandError::Usage(format!("`{comment_arg}` is not a comment id"))
        })?;

        let found = self.imgur.contains_comment(post_id, comment_id).await?;
        let reply = if found {
            format!("Comment `{comment_id}` is in the thread of post `{post_id}`.")
        } else {
            format!("Comment `{comment_id}` was not found under post `{post_id}`.")
        };

        Ok(CommandReply::text(reply))
    }

    fn describe(&self) -> &str {
        "findcomment <post id> <comment id> - check whether a comment is anywhere in a post's thread"
    }
}

/// `rating <post id>` - classify how explicit a post is.
pub struct RatingCommand<C: ImgurClient> {
    imgur: Arc<ImgurService<C>>,
}

impl<C: ImgurClient> RatingCommand<C> {
    pub fn new(imgur: Arc<ImgurService<C>>) -> Self {
        Self { imgur }
    }
}

#[async_trait]
impl<C: ImgurClient> BotCommand for RatingCommand<C> {
    async fn execute(
        &self,
        _ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let [post_id] = args else {
            return Err(CommandError::Usage("expected one post id".to_string()));
        };

        let rating = self.imgur.post_rating(post_id).await?;
        Ok(CommandReply::text(format!(
            "Post `{post_id}` is rated **{rating}**."
        )))
    }

    fn describe(&self) -> &str {
        "rating <post id> - show whether a post is safe, questionable or explicit"
    }
}
