// Prefix-command router.
//
// Turns a Discord message into a `CommandContext`, dispatches it through the
// registry and posts whatever comes back. This is the one place that catches
// command errors and turns them into user-facing text.

use poise::serenity_prelude as serenity;

use crate::core::commands::{
    parse_invocation, CommandContext, CommandError, CommandRegistry, Invoker,
};
use crate::core::tracking::{PermissionLevel, PlatformIdentity};
use crate::discord::{Data, Error};

/// Discord's hard limit on message length.
const MAX_MESSAGE_CHARS: usize = 2000;

pub async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }
    let Some((name, args)) = parse_invocation(&message.content, &data.prefix) else {
        return Ok(());
    };

    let command_ctx = build_context(ctx, message, data).await;
    tracing::debug!(
        command = %name,
        guild_id = ?command_ctx.guild_id,
        channel_id = command_ctx.channel_id,
        user_id = command_ctx.invoker.user_id,
        user = %command_ctx.invoker.name,
        "Dispatching command"
    );

    let content = match data.commands.dispatch(&command_ctx, &name, &args).await {
        Ok(reply) => reply.content,
        Err(err) => {
            log_command_error(&name, &command_ctx, &err);
            format_error(&data.commands, &data.prefix, &name, &err)
        }
    };

    for chunk in split_message(&content) {
        message.channel_id.say(&ctx.http, chunk).await?;
    }

    Ok(())
}

async fn build_context(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> CommandContext {
    let guild_id = message.guild_id.map(|id| id.get());
    let user_id = message.author.id.get();

    let mut permission = discord_permission(ctx, message);
    if let Some(guild_id) = guild_id {
        match data.trackers.permission_for(guild_id, user_id).await {
            Ok(Some(tracked)) => permission = permission.max(tracked),
            Ok(None) => {}
            Err(e) => tracing::warn!(guild_id, user_id, "Failed to look up tracker permission: {}", e),
        }
    }

    CommandContext {
        guild_id,
        channel_id: message.channel_id.get(),
        invoker: Invoker {
            user_id,
            name: message.author.name.clone(),
            permission,
        },
        mentions: message
            .mentions
            .iter()
            .map(|user| PlatformIdentity::new(user.name.clone(), user.id.get()))
            .collect(),
    }
}

/// Permission the invoker holds through Discord itself.
///
/// Reads the guild from the cache and drops the cache guard before returning, so
/// nothing non-Send is held across an await.
fn discord_permission(ctx: &serenity::Context, message: &serenity::Message) -> PermissionLevel {
    let Some(guild_id) = message.guild_id else {
        return PermissionLevel::User;
    };
    let Some(guild) = ctx.cache.guild(guild_id) else {
        return PermissionLevel::User;
    };
    if guild.owner_id == message.author.id {
        return PermissionLevel::Admin;
    }
    let Some(member) = guild.members.get(&message.author.id) else {
        return PermissionLevel::User;
    };

    // @everyone shares the guild's id.
    let everyone = serenity::RoleId::new(guild_id.get());
    let permissions = member
        .roles
        .iter()
        .chain(std::iter::once(&everyone))
        .filter_map(|role_id| guild.roles.get(role_id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions);

    level_from_permissions(permissions)
}

pub fn level_from_permissions(permissions: serenity::Permissions) -> PermissionLevel {
    if permissions.contains(serenity::Permissions::ADMINISTRATOR) {
        PermissionLevel::Admin
    } else if permissions.contains(serenity::Permissions::MANAGE_GUILD)
        || permissions.contains(serenity::Permissions::MANAGE_MESSAGES)
    {
        PermissionLevel::Moderator
    } else {
        PermissionLevel::User
    }
}

fn log_command_error(name: &str, ctx: &CommandContext, err: &CommandError) {
    match err {
        CommandError::Tracking(_) | CommandError::Imgur(_) => tracing::warn!(
            command = %name,
            guild_id = ?ctx.guild_id,
            user_id = ctx.invoker.user_id,
            error = %err,
            "Command failed"
        ),
        _ => tracing::debug!(command = %name, error = %err, "Command rejected"),
    }
}

/// User-facing text for a failed command.
pub fn format_error(
    registry: &CommandRegistry,
    prefix: &str,
    name: &str,
    err: &CommandError,
) -> String {
    match err {
        CommandError::Usage(reason) => match registry.describe(name) {
            Some(usage) => format!("{reason}\nUsage: `{prefix}{usage}`"),
            None => reason.clone(),
        },
        CommandError::UnknownCommand(unknown) => {
            format!("Unknown command `{unknown}`. Try `{prefix}help`.")
        }
        other => format!("⚠️ {other}"),
    }
}

/// Split on character boundaries so no chunk exceeds Discord's limit.
fn split_message(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .chars()
        .collect::<Vec<char>>()
        .chunks(MAX_MESSAGE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::{BotCommand, CommandReply};
    use crate::core::imgur::ImgurError;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl BotCommand for Noop {
        async fn execute(
            &self,
            _ctx: &CommandContext,
            _args: &[String],
        ) -> Result<CommandReply, CommandError> {
            Ok(CommandReply::text("ok"))
        }

        fn describe(&self) -> &str {
            "noop <thing> - does nothing"
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register("noop", Noop);
        registry
    }

    #[test]
    fn usage_errors_show_the_command_usage() {
        let text = format_error(
            &registry(),
            "!",
            "noop",
            &CommandError::Usage("expected a thing".into()),
        );
        assert_eq!(text, "expected a thing\nUsage: `!noop <thing> - does nothing`");
    }

    #[test]
    fn unknown_commands_point_at_help() {
        let text = format_error(
            &registry(),
            "?",
            "bogus",
            &CommandError::UnknownCommand("bogus".into()),
        );
        assert_eq!(text, "Unknown command `bogus`. Try `?help`.");
    }

    #[test]
    fn other_errors_use_their_message() {
        let text = format_error(
            &registry(),
            "!",
            "noop",
            &CommandError::Imgur(ImgurError::RateLimited),
        );
        assert_eq!(text, "⚠️ Imgur rate limit hit, try again later");

        let text = format_error(
            &registry(),
            "!",
            "noop",
            &CommandError::PermissionDenied {
                required: PermissionLevel::Moderator,
            },
        );
        assert_eq!(text, "⚠️ You need moderator permission to do that");
    }

    #[test]
    fn permission_levels_from_discord_flags() {
        use poise::serenity_prelude::Permissions;

        assert_eq!(
            level_from_permissions(Permissions::ADMINISTRATOR | Permissions::SEND_MESSAGES),
            PermissionLevel::Admin
        );
        assert_eq!(
            level_from_permissions(Permissions::MANAGE_GUILD),
            PermissionLevel::Moderator
        );
        assert_eq!(
            level_from_permissions(Permissions::MANAGE_MESSAGES),
            PermissionLevel::Moderator
        );
        assert_eq!(
            level_from_permissions(Permissions::SEND_MESSAGES),
            PermissionLevel::User
        );
    }

    #[test]
    fn long_replies_are_split_on_char_boundaries() {
        let content = "é".repeat(MAX_MESSAGE_CHARS + 5);
        let chunks = split_message(&content);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(chunks[1].chars().count(), 5);
        assert!(split_message("").is_empty());
    }
}
