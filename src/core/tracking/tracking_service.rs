// Tracking service - links Discord members to Imgur accounts per guild.
// Like the other core services it is generic over its ports, so tests can run it
// against fakes without Discord or the network.

use async_trait::async_trait;

use crate::core::imgur::{validate_imgur_id, ImgurClient};

use super::tracking_models::{PermissionLevel, PlatformIdentity, Tracker, TrackerError};

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Where trackers live. Keyed by guild and Imgur account id.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// Insert or replace. Returns the previous tracker for the same Imgur account.
    async fn upsert(&self, guild_id: u64, tracker: Tracker) -> Result<Option<Tracker>, TrackerError>;

    async fn get(&self, guild_id: u64, imgur_id: u64) -> Result<Option<Tracker>, TrackerError>;

    /// Look up by Imgur name (case-insensitive).
    async fn find_by_imgur_name(
        &self,
        guild_id: u64,
        imgur_name: &str,
    ) -> Result<Option<Tracker>, TrackerError>;

    async fn remove(&self, guild_id: u64, imgur_id: u64) -> Result<Option<Tracker>, TrackerError>;

    async fn list(&self, guild_id: u64) -> Result<Vec<Tracker>, TrackerError>;

    /// Every tracker in the guild that belongs to this Discord member.
    async fn find_by_discord_id(
        &self,
        guild_id: u64,
        discord_id: u64,
    ) -> Result<Vec<Tracker>, TrackerError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct TrackerService<C: ImgurClient, S: TrackerStore> {
    client: C,
    store: S,
}

impl<C, S> TrackerService<C, S>
where
    C: ImgurClient,
    S: TrackerStore,
{
    pub fn new(client: C, store: S) -> Self {
        Self { client, store }
    }

    fn validate_guild_id(guild_id: u64) -> Result<(), TrackerError> {
        if guild_id == 0 {
            Err(TrackerError::InvalidGuild)
        } else {
            Ok(())
        }
    }

    /// `acting` may change a tracker only if it holds at least the tracker's
    /// permission. Handing the tracker to a different member additionally needs
    /// a level above it, except for admins.
    fn authorize_change(
        existing: &Tracker,
        acting: PermissionLevel,
        new_discord_id: Option<u64>,
    ) -> Result<(), TrackerError> {
        let held = existing.permission();
        if acting < held {
            return Err(TrackerError::Outranked { required: held });
        }

        let moving = new_discord_id.is_some_and(|id| id != existing.discord().id);
        if moving && acting <= held && acting != PermissionLevel::Admin {
            return Err(TrackerError::Outranked {
                required: held.above(),
            });
        }
        Ok(())
    }

    /// Resolve `imgur_name` on Imgur and start tracking it for `discord`.
    ///
    /// An existing tracker for the same Imgur account is replaced, so re-running
    /// the command is how permissions get changed. `acting` is the permission of
    /// whoever asked; see `authorize_change`.
    pub async fn track(
        &self,
        guild_id: u64,
        discord: PlatformIdentity,
        imgur_name: &str,
        permission: PermissionLevel,
        acting: PermissionLevel,
    ) -> Result<Tracker, TrackerError> {
        Self::validate_guild_id(guild_id)?;

        let imgur_name = validate_imgur_id("account name", imgur_name)
            .map_err(|_| TrackerError::UnknownImgurAccount(imgur_name.trim().to_string()))?;

        let account = self
            .client
            .get_account(imgur_name)
            .await
            .map_err(|err| {
                if err.is_not_found() || err.is_bad_request() {
                    TrackerError::UnknownImgurAccount(imgur_name.to_string())
                } else {
                    TrackerError::Imgur(err)
                }
            })?;

        let existing = self.store.get(guild_id, account.id).await?;
        let tracker = match existing {
            Some(existing) => {
                Self::authorize_change(&existing, acting, Some(discord.id))?;
                if existing.discord().id == discord.id {
                    // Same member: keep the original tracking date.
                    existing.with_permission(permission)
                } else {
                    Tracker::new(discord, existing.imgur().clone(), permission)?
                }
            }
            None => Tracker::new(
                discord,
                PlatformIdentity::new(account.name, account.id),
                permission,
            )?,
        };

        if let Some(previous) = self.store.upsert(guild_id, tracker.clone()).await? {
            tracing::info!(
                guild_id,
                imgur = %previous.imgur().name,
                old_permission = %previous.permission(),
                new_permission = %tracker.permission(),
                "Replaced existing tracker"
            );
        } else {
            tracing::info!(guild_id, imgur = %tracker.imgur().name, "Tracking new account");
        }

        Ok(tracker)
    }

    /// Stop tracking an Imgur account. Returns whether anything was removed.
    pub async fn untrack(
        &self,
        guild_id: u64,
        imgur_name: &str,
        acting: PermissionLevel,
    ) -> Result<bool, TrackerError> {
        Self::validate_guild_id(guild_id)?;

        let Some(existing) = self
            .store
            .find_by_imgur_name(guild_id, imgur_name.trim())
            .await?
        else {
            return Ok(false);
        };
        Self::authorize_change(&existing, acting, None)?;

        let removed = self.store.remove(guild_id, existing.imgur().id).await?;
        if removed.is_some() {
            tracing::info!(guild_id, imgur = %existing.imgur().name, "Stopped tracking account");
        }
        Ok(removed.is_some())
    }

    /// All trackers in a guild, sorted by Imgur name.
    pub async fn list(&self, guild_id: u64) -> Result<Vec<Tracker>, TrackerError> {
        Self::validate_guild_id(guild_id)?;
        let mut trackers = self.store.list(guild_id).await?;
        trackers.sort_by_key(|t| t.imgur().name.to_ascii_lowercase());
        Ok(trackers)
    }

    /// Highest permission granted to this member by any of their trackers.
    pub async fn permission_for(
        &self,
        guild_id: u64,
        discord_id: u64,
    ) -> Result<Option<PermissionLevel>, TrackerError> {
        Self::validate_guild_id(guild_id)?;
        Ok(self
            .store
            .find_by_discord_id(guild_id, discord_id)
            .await?
            .iter()
            .map(Tracker::permission)
            .max())
    }
}
