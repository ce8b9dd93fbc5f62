// The command contract.
//
// Every bot command implements `BotCommand`: it can be executed against a
// `CommandContext` with a list of arguments, and it can describe its own usage.
// The registry only ever sees that trait, so adding a command never touches the
// router.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::imgur::ImgurError;
use crate::core::tracking::{PermissionLevel, PlatformIdentity, TrackerError};

// ============================================================================
// CONTEXT
// ============================================================================

/// Who ran a command and what permission they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub user_id: u64,
    pub name: String,
    pub permission: PermissionLevel,
}

/// Everything a command may know about where it was invoked.
/// Built by the Discord router from the incoming message.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub invoker: Invoker,
    /// Users mentioned in the message, in mention order.
    pub mentions: Vec<PlatformIdentity>,
}

impl CommandContext {
    pub fn require_guild(&self) -> Result<u64, CommandError> {
        self.guild_id.ok_or(CommandError::GuildOnly)
    }

    pub fn require_permission(&self, required: PermissionLevel) -> Result<(), CommandError> {
        if self.invoker.permission >= required {
            Ok(())
        } else {
            Err(CommandError::PermissionDenied { required })
        }
    }

    pub fn mentioned(&self, user_id: u64) -> Option<&PlatformIdentity> {
        self.mentions.iter().find(|m| m.id == user_id)
    }
}

// ============================================================================
// RESULT TYPES
// ============================================================================

/// What a command wants sent back to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub content: String,
}

impl CommandReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// Arguments didn't match the command's usage. The router answers with
    /// the command's `describe()` text.
    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("You need {required} permission to do that")]
    PermissionDenied { required: PermissionLevel },

    #[error("This command only works in servers")]
    GuildOnly,

    #[error("Unknown command `{0}`")]
    UnknownCommand(String),

    #[error(transparent)]
    Tracking(#[from] TrackerError),

    #[error(transparent)]
    Imgur(#[from] ImgurError),
}

// ============================================================================
// COMMAND TRAIT
// ============================================================================

#[async_trait]
pub trait BotCommand: Send + Sync {
    /// Run the command. Failures are returned to the caller, never swallowed.
    async fn execute(
        &self,
        ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError>;

    /// Static usage help. Must not have side effects.
    fn describe(&self) -> &str;
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Name-keyed lookup of commands. Names are stored lowercase.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn BotCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. A later registration under the same name wins.
    pub fn register(&mut self, name: &str, command: impl BotCommand + 'static) {
        let name = name.to_ascii_lowercase();
        if self.commands.insert(name.clone(), Box::new(command)).is_some() {
            tracing::warn!(command = %name, "Command registered twice, keeping the latest");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn BotCommand> {
        self.commands
            .get(&name.to_ascii_lowercase())
            .map(|command| command.as_ref())
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.get(name).map(|command| command.describe())
    }

    /// `(name, usage)` for every command, sorted by name.
    pub fn catalog(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .map(|(name, command)| (name.as_str(), command.describe()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        name: &str,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        command.execute(ctx, args).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(permission: PermissionLevel) -> CommandContext {
        CommandContext {
            guild_id: Some(1),
            channel_id: 10,
            invoker: Invoker {
                user_id: 500,
                name: "tester".to_string(),
                permission,
            },
            mentions: Vec::new(),
        }
    }

    pub fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }
}
