// This is the entry point of the Imgur tracker bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (HTTP client, in-memory store, config)
// - `discord/` = Discord-specific adapters (router, commands)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Build the command registry
// 4. Set up the Discord framework and route messages to it

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use crate::core::imgur::ImgurService;
use crate::core::tracking::TrackerService;
use crate::discord::commands::build_registry;
use crate::discord::{router, Data, Error};
use crate::infra::config::BotConfig;
use crate::infra::imgur::ImgurApiClient;
use crate::infra::tracking::InMemoryTrackerStore;

/// Event handler for non-slash Discord events.
/// Every message goes through the prefix-command router.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        if let Err(e) = router::handle_message(ctx, new_message, data).await {
            tracing::error!(
                channel_id = new_message.channel_id.get(),
                "Failed to handle message: {}",
                e
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let imgur_client = ImgurApiClient::new(&config.imgur_client_id)
        .context("Failed to create Imgur API client")?;

    let tracker_service = Arc::new(TrackerService::new(
        imgur_client.clone(),
        InMemoryTrackerStore::new(),
    ));
    let imgur_service = Arc::new(ImgurService::new(imgur_client));

    let registry = build_registry(
        Arc::clone(&tracker_service),
        imgur_service,
        &config.command_prefix,
    );
    tracing::info!(
        commands = registry.len(),
        prefix = %config.command_prefix,
        "Command registry ready"
    );

    let data = Data {
        trackers: tracker_service,
        commands: Arc::new(registry),
        prefix: config.command_prefix.clone(),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::help::help()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                tracing::info!("Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;

    Ok(())
}
