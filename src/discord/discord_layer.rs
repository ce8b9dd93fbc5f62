// Discord layer - commands and event handlers.

use std::sync::Arc;

use crate::core::commands::CommandRegistry;
use crate::core::tracking::TrackerService;
use crate::infra::imgur::ImgurApiClient;
use crate::infra::tracking::InMemoryTrackerStore;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "router.rs"]
pub mod router;

pub type Trackers = TrackerService<ImgurApiClient, InMemoryTrackerStore>;

/// Shared state handed to every poise command and event.
pub struct Data {
    pub trackers: Arc<Trackers>,
    pub commands: Arc<CommandRegistry>,
    pub prefix: String,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
