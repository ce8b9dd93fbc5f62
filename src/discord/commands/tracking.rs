// Prefix commands for managing trackers.
//
// **Notice the pattern:**
// 1. Check guild and permission on the context
// 2. Parse arguments into domain types
// 3. Call the core service and format the result
//
// Every failure is returned as a `CommandError`; the router decides how to show it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::commands::{BotCommand, CommandContext, CommandError, CommandReply};
use crate::core::imgur::ImgurClient;
use crate::core::tracking::{PermissionLevel, TrackerService, TrackerStore};

/// Accepts `<@123>` or `<@!123>`. Bare ids are refused: only real mentions
/// arrive with the member's name.
fn parse_user_mention(arg: &str) -> Option<u64> {
    arg.strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.strip_prefix('!').unwrap_or(rest))
        .and_then(|id| id.parse().ok())
        .filter(|id| *id != 0)
}

pub struct TrackCommand<C: ImgurClient, S: TrackerStore> {
    trackers: Arc<TrackerService<C, S>>,
}

impl<C: ImgurClient, S: TrackerStore> TrackCommand<C, S> {
    pub fn new(trackers: Arc<TrackerService<C, S>>) -> Self {
        Self { trackers }
    }
}

#[async_trait]
impl<C: ImgurClient, S: TrackerStore> BotCommand for TrackCommand<C, S> {
    async fn execute(
        &self,
        ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let guild_id = ctx.require_guild()?;
        ctx.require_permission(PermissionLevel::Moderator)?;

        let (member_arg, imgur_name, permission_arg) = match args {
            [member, imgur] => (member, imgur, None),
            [member, imgur, permission] => (member, imgur, Some(permission)),
            _ => {
                return Err(CommandError::Usage(
                    "expected a member and an Imgur name".to_string(),
                ))
            }
        };

        let discord_id = parse_user_mention(member_arg).ok_or_else(|| {
            CommandError::Usage(format!("`{member_arg}` is not a member mention"))
        })?;
        let discord = ctx.mentioned(discord_id).cloned().ok_or_else(|| {
            CommandError::Usage("mention the member so their name can be recorded".to_string())
        })?;

        let permission = match permission_arg {
            Some(raw) => raw.parse::<PermissionLevel>()?,
            None => PermissionLevel::User,
        };
        // Nobody can hand out more than they hold.
        ctx.require_permission(permission)?;

        let tracker = self
            .trackers
            .track(guild_id, discord, imgur_name, permission, ctx.invoker.permission)
            .await?;

        Ok(CommandReply::text(format!(
            "Now tracking Imgur account `{}` for <@{}> with {} permission.",
            tracker.imgur().name,
            tracker.discord().id,
            tracker.permission()
        )))
    }

    fn describe(&self) -> &str {
        "track <@member> <imgur name> [user|moderator|admin] - link a member to an Imgur account (moderators only)"
    }
}

pub struct UntrackCommand<C: ImgurClient, S: TrackerStore> {
    trackers: Arc<TrackerService<C, S>>,
}

impl<C: ImgurClient, S: TrackerStore> UntrackCommand<C, S> {
    pub fn new(trackers: Arc<TrackerService<C, S>>) -> Self {
        Self { trackers }
    }
}

#[async_trait]
impl<C: ImgurClient, S: TrackerStore> BotCommand for UntrackCommand<C, S> {
    async fn execute(
        &self,
        ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let guild_id = ctx.require_guild()?;
        ctx.require_permission(PermissionLevel::Moderator)?;

        let [imgur_name] = args else {
            return Err(CommandError::Usage("expected one Imgur name".to_string()));
        };

        if self
            .trackers
            .untrack(guild_id, imgur_name, ctx.invoker.permission)
            .await? {
            Ok(CommandReply::text(format!(
                "Stopped tracking Imgur account `{imgur_name}`."
            )))
        } else {
            Ok(CommandReply::text(format!(
                "No tracker found for `{imgur_name}`."
            )))
        }
    }

    fn describe(&self) -> &str {
        "untrack <imgur name> - stop tracking an Imgur account (moderators only)"
    }
}

pub struct TrackersCommand<C: ImgurClient, S: TrackerStore> {
    trackers: Arc<TrackerService<C, S>>,
}

impl<C: ImgurClient, S: TrackerStore> TrackersCommand<C, S> {
    pub fn new(trackers: Arc<TrackerService<C, S>>) -> Self {
        Self { trackers }
    }
}

#[async_trait]
impl<C: ImgurClient, S: TrackerStore> BotCommand for TrackersCommand<C, S> {
    async fn execute(
        &self,
        ctx: &CommandContext,
        _args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let guild_id = ctx.require_guild()?;
        let trackers = self.trackers.list(guild_id).await?;

        if trackers.is_empty() {
            return Ok(CommandReply::text(
                "No Imgur accounts are being tracked in this server.",
            ));
        }

        let lines: Vec<String> = trackers
            .iter()
            .map(|t| {
                format!(
                    "- `{}` -> <@{}> ({}, since <t:{}:R>)",
                    t.imgur().name,
                    t.discord().id,
                    t.permission(),
                    t.tracked_since().timestamp()
                )
            })
            .collect();

        Ok(CommandReply::text(format!(
            "**Tracked Imgur accounts ({}):**\n{}",
            trackers.len(),
            lines.join("\n")
        )))
    }

    fn describe(&self) -> &str {
        "trackers - list the Imgur accounts tracked in this server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::test_support::{args, context};
    use crate::core::imgur::imgur_service::test_support::FakeImgurClient;
    use crate::core::tracking::{PlatformIdentity, TrackerError};
    use crate::infra::tracking::InMemoryTrackerStore;

    type Service = TrackerService<FakeImgurClient, InMemoryTrackerStore>;

    fn service() -> Arc<Service> {
        Arc::new(TrackerService::new(
            FakeImgurClient::default().with_account("CrabPoster", 99),
            InMemoryTrackerStore::new(),
        ))
    }

    fn mod_context() -> CommandContext {
        let mut ctx = context(PermissionLevel::Moderator);
        ctx.mentions.push(PlatformIdentity::new("ferris", 42));
        ctx
    }

    #[test]
    fn parses_only_real_mentions() {
        assert_eq!(parse_user_mention("<@42>"), Some(42));
        assert_eq!(parse_user_mention("<@!42>"), Some(42));
        assert_eq!(parse_user_mention("42"), None);
        assert_eq!(parse_user_mention("<@0>"), None);
        assert_eq!(parse_user_mention("ferris"), None);
    }

    #[tokio::test]
    async fn track_then_list() {
        let service = service();
        let track = TrackCommand::new(Arc::clone(&service));
        let list = TrackersCommand::new(Arc::clone(&service));

        let reply = track
            .execute(&mod_context(), &args(&["<@42>", "crabposter"]))
            .await
            .unwrap();
        assert!(reply.content.contains("`CrabPoster`"));
        assert!(reply.content.contains("<@42>"));

        let reply = list.execute(&mod_context(), &[]).await.unwrap();
        assert!(reply.content.contains("(1)"));
        assert!(reply.content.contains("`CrabPoster` -> <@42> (user"));
    }

    #[tokio::test]
    async fn track_requires_moderator() {
        let mut ctx = mod_context();
        ctx.invoker.permission = PermissionLevel::User;

        let err = TrackCommand::new(service())
            .execute(&ctx, &args(&["<@42>", "crabposter"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn cannot_grant_more_than_invoker_holds() {
        let err = TrackCommand::new(service())
            .execute(&mod_context(), &args(&["<@42>", "crabposter", "admin"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::PermissionDenied {
                required: PermissionLevel::Admin
            }
        ));
    }

    #[tokio::test]
    async fn track_reports_usage_and_domain_errors() {
        let track = TrackCommand::new(service());

        let err = track.execute(&mod_context(), &args(&["<@42>"])).await.unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));

        // Not mentioned, so there is no name to record.
        let err = track
            .execute(&mod_context(), &args(&["<@43>", "crabposter"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));

        let err = track
            .execute(&mod_context(), &args(&["<@42>", "crabposter", "owner"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Tracking(TrackerError::InvalidPermission(_))
        ));

        let err = track
            .execute(&mod_context(), &args(&["<@42>", "nobody"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No Imgur account named `nobody`");
    }

    #[tokio::test]
    async fn bare_ids_are_usage_errors() {
        let err = TrackCommand::new(service())
            .execute(&mod_context(), &args(&["42", "crabposter"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Usage(ref reason) if reason.contains("mention")));
    }

    #[tokio::test]
    async fn moderator_cannot_override_an_admin_tracker() {
        let service = service();
        let mut admin = context(PermissionLevel::Admin);
        admin.mentions.push(PlatformIdentity::new("boss", 7));
        TrackCommand::new(Arc::clone(&service))
            .execute(&admin, &args(&["<@7>", "crabposter", "admin"]))
            .await
            .unwrap();

        let mut moderator = context(PermissionLevel::Moderator);
        moderator.mentions.push(PlatformIdentity::new("tester", 500));
        let err = TrackCommand::new(Arc::clone(&service))
            .execute(&moderator, &args(&["<@500>", "crabposter", "user"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Tracking(TrackerError::Outranked {
                required: PermissionLevel::Admin
            })
        ));

        let err = UntrackCommand::new(Arc::clone(&service))
            .execute(&moderator, &args(&["crabposter"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Tracking(TrackerError::Outranked { .. })
        ));

        assert_eq!(
            service.permission_for(1, 7).await.unwrap(),
            Some(PermissionLevel::Admin)
        );
    }

    #[tokio::test]
    async fn untrack_removes_and_reports_missing() {
        let service = service();
        TrackCommand::new(Arc::clone(&service))
            .execute(&mod_context(), &args(&["<@42>", "crabposter"]))
            .await
            .unwrap();
        let untrack = UntrackCommand::new(Arc::clone(&service));

        let reply = untrack
            .execute(&mod_context(), &args(&["crabposter"]))
            .await
            .unwrap();
        assert!(reply.content.starts_with("Stopped tracking"));

        let reply = untrack
            .execute(&mod_context(), &args(&["crabposter"]))
            .await
            .unwrap();
        assert!(reply.content.starts_with("No tracker found"));
    }

    #[tokio::test]
    async fn tracker_commands_are_guild_only() {
        let mut ctx = mod_context();
        ctx.guild_id = None;

        let err = TrackersCommand::new(service())
            .execute(&ctx, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::GuildOnly));
    }

    #[tokio::test]
    async fn empty_list_has_friendly_message() {
        let reply = TrackersCommand::new(service())
            .execute(&context(PermissionLevel::User), &[])
            .await
            .unwrap();
        assert_eq!(
            reply.content,
            "No Imgur accounts are being tracked in this server."
        );
    }

    #[test]
    fn descriptions_are_present() {
        let service = service();
        let track = TrackCommand::new(Arc::clone(&service));
        assert!(track.describe().starts_with("track "));
        assert_eq!(track.describe(), track.describe());
        assert!(!UntrackCommand::new(Arc::clone(&service)).describe().is_empty());
        assert!(!TrackersCommand::new(service).describe().is_empty());
    }
}
