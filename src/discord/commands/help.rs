use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use crate::core::commands::{BotCommand, CommandContext, CommandError, CommandReply};
use crate::discord::{Context, Error};

pub const HELP_USAGE: &str = "help [command] - show usage for one command, or for all of them";

/// Prefix `help` command. Holds a snapshot of the catalog taken when the
/// registry was built, since it cannot borrow the registry it lives in.
pub struct HelpCommand {
    entries: Vec<(String, String)>,
    prefix: String,
}

impl HelpCommand {
    pub fn new(mut entries: Vec<(String, String)>, prefix: impl Into<String>) -> Self {
        entries.sort();
        Self {
            entries,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl BotCommand for HelpCommand {
    async fn execute(
        &self,
        _ctx: &CommandContext,
        args: &[String],
    ) -> Result<CommandReply, CommandError> {
        match args {
            [] => {
                let lines: Vec<String> = self
                    .entries
                    .iter()
                    .map(|(_, usage)| format!("`{}{}`", self.prefix, usage))
                    .collect();
                Ok(CommandReply::text(format!(
                    "**Commands:**\n{}",
                    lines.join("\n")
                )))
            }
            [name] => {
                let wanted = name.to_ascii_lowercase();
                let (_, usage) = self
                    .entries
                    .iter()
                    .find(|(entry, _)| *entry == wanted)
                    .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;
                Ok(CommandReply::text(format!("`{}{}`", self.prefix, usage)))
            }
            _ => Err(CommandError::Usage("expected at most one command name".to_string())),
        }
    }

    fn describe(&self) -> &str {
        HELP_USAGE
    }
}

/// Show every prefix command with its usage.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let entries: Vec<String> = data
        .commands
        .catalog()
        .into_iter()
        .map(|(_, usage)| format!("- `{}{}`", data.prefix, usage))
        .collect();

    let mut embed = serenity::CreateEmbed::new()
        .title("Imgur Tracker Commands")
        .description(format!(
            "Commands start with `{}`. Arguments with spaces can be wrapped in double quotes.",
            data.prefix
        ))
        .color(serenity::Colour::from_rgb(88, 101, 242))
        .timestamp(serenity::Timestamp::now());

    // Chunk entries to avoid hitting the 1024 char limit per field
    for (i, chunk) in chunk_entries(&entries).iter().enumerate() {
        let field_name = if i == 0 { "Usage" } else { "Usage (cont.)" };
        embed = embed.field(field_name, chunk.join("\n"), false);
    }

    embed = embed.footer(serenity::CreateEmbedFooter::new(
        "Tracking commands need moderator permission.",
    ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current_chunk = Vec::new();
    let mut current_length = 0;

    for entry in entries {
        let entry_len = entry.len();
        // Discord field value limit is 1024. We leave a bit of buffer.
        if current_length + entry_len + 1 > 1000 && !current_chunk.is_empty() {
            chunks.push(std::mem::take(&mut current_chunk));
            current_length = 0;
        }

        current_chunk.push(entry.clone());
        current_length += entry_len + 1; // +1 for newline
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}
