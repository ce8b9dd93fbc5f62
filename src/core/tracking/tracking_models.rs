// Tracking domain models.
//
// A tracker links one Discord member to one Imgur account and records what the
// member is allowed to do through the bot. These types carry no Discord or HTTP
// dependencies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// What a member may do through bot commands. Ordered so checks can use `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PermissionLevel {
    #[default]
    User,
    Moderator,
    Admin,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::User => write!(f, "user"),
            PermissionLevel::Moderator => write!(f, "moderator"),
            PermissionLevel::Admin => write!(f, "admin"),
        }
    }
}

impl PermissionLevel {
    /// The next level up. `Admin` is the top and maps to itself.
    pub fn above(self) -> Self {
        match self {
            PermissionLevel::User => PermissionLevel::Moderator,
            PermissionLevel::Moderator | PermissionLevel::Admin => PermissionLevel::Admin,
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(PermissionLevel::User),
            "mod" | "moderator" => Ok(PermissionLevel::Moderator),
            "admin" => Ok(PermissionLevel::Admin),
            _ => Err(TrackerError::InvalidPermission(s.to_string())),
        }
    }
}

/// A name and numeric id on one external platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformIdentity {
    pub name: String,
    pub id: u64,
}

impl PlatformIdentity {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    fn validate(&self, platform: &'static str) -> Result<(), TrackerError> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::InvalidIdentity {
                platform,
                reason: "name is empty",
            });
        }
        if self.id == 0 {
            return Err(TrackerError::InvalidIdentity {
                platform,
                reason: "id must be non-zero",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Invalid {platform} identity: {reason}")]
    InvalidIdentity {
        platform: &'static str,
        reason: &'static str,
    },

    #[error("Unknown permission level `{0}` (expected user, moderator or admin)")]
    InvalidPermission(String),

    #[error("No Imgur account named `{0}`")]
    UnknownImgurAccount(String),

    #[error("Invalid guild ID")]
    InvalidGuild,

    #[error("You need {required} permission to change that tracker")]
    Outranked { required: PermissionLevel },

    #[error("Imgur lookup failed: {0}")]
    Imgur(#[from] crate::core::imgur::ImgurError),
}

/// A Discord member linked to an Imgur account.
///
/// **Immutable once built.** The constructor validates both identities, so an
/// invalid tracker can never exist. Changing the permission produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    discord: PlatformIdentity,
    imgur: PlatformIdentity,
    permission: PermissionLevel,
    tracked_since: DateTime<Utc>,
}

impl Tracker {
    pub fn new(
        discord: PlatformIdentity,
        imgur: PlatformIdentity,
        permission: PermissionLevel,
    ) -> Result<Self, TrackerError> {
        Self::with_timestamp(discord, imgur, permission, Utc::now())
    }

    pub fn with_timestamp(
        discord: PlatformIdentity,
        imgur: PlatformIdentity,
        permission: PermissionLevel,
        tracked_since: DateTime<Utc>,
    ) -> Result<Self, TrackerError> {
        discord.validate("Discord")?;
        imgur.validate("Imgur")?;

        Ok(Self {
            discord,
            imgur,
            permission,
            tracked_since,
        })
    }

    pub fn discord(&self) -> &PlatformIdentity {
        &self.discord
    }

    pub fn imgur(&self) -> &PlatformIdentity {
        &self.imgur
    }

    pub fn permission(&self) -> PermissionLevel {
        self.permission
    }

    pub fn tracked_since(&self) -> DateTime<Utc> {
        self.tracked_since
    }

    pub fn with_permission(self, permission: PermissionLevel) -> Self {
        Self { permission, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discord() -> PlatformIdentity {
        PlatformIdentity::new("ferris", 1234)
    }

    fn imgur() -> PlatformIdentity {
        PlatformIdentity::new("crabposter", 99)
    }

    #[test]
    fn builds_valid_tracker() {
        let tracker = Tracker::new(discord(), imgur(), PermissionLevel::Moderator).unwrap();
        assert_eq!(tracker.discord().id, 1234);
        assert_eq!(tracker.imgur().name, "crabposter");
        assert_eq!(tracker.permission(), PermissionLevel::Moderator);
    }

    #[test]
    fn rejects_empty_names_and_zero_ids() {
        let err = Tracker::new(
            PlatformIdentity::new("  ", 1),
            imgur(),
            PermissionLevel::User,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TrackerError::InvalidIdentity {
                platform: "Discord",
                reason: "name is empty"
            }
        );

        let err = Tracker::new(discord(), PlatformIdentity::new("x", 0), PermissionLevel::User)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Imgur identity: id must be non-zero");
    }

    #[test]
    fn with_permission_returns_new_value() {
        let original = Tracker::new(discord(), imgur(), PermissionLevel::User).unwrap();
        let promoted = original.clone().with_permission(PermissionLevel::Admin);

        assert_eq!(original.permission(), PermissionLevel::User);
        assert_eq!(promoted.permission(), PermissionLevel::Admin);
        assert_eq!(promoted.tracked_since(), original.tracked_since());
    }

    #[test]
    fn permission_levels_parse_and_order() {
        assert_eq!("MOD".parse::<PermissionLevel>(), Ok(PermissionLevel::Moderator));
        assert_eq!("admin".parse::<PermissionLevel>(), Ok(PermissionLevel::Admin));
        assert!("owner".parse::<PermissionLevel>().is_err());
        assert!(PermissionLevel::User < PermissionLevel::Moderator);
        assert!(PermissionLevel::Moderator < PermissionLevel::Admin);
    }

    #[test]
    fn above_steps_up_and_stops_at_admin() {
        assert_eq!(PermissionLevel::User.above(), PermissionLevel::Moderator);
        assert_eq!(PermissionLevel::Moderator.above(), PermissionLevel::Admin);
        assert_eq!(PermissionLevel::Admin.above(), PermissionLevel::Admin);
    }
}
