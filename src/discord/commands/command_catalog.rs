// Discord commands module.
// Each feature gets its own command file; `build_registry` wires them together.

use std::sync::Arc;

use crate::core::commands::CommandRegistry;
use crate::core::imgur::{ImgurClient, ImgurService};
use crate::core::tracking::{TrackerService, TrackerStore};

pub mod comments;

pub mod help;

pub mod tracking;

/// Register every prefix command under its name.
pub fn build_registry<C, S>(
    trackers: Arc<TrackerService<C, S>>,
    imgur: Arc<ImgurService<C>>,
    prefix: &str,
) -> CommandRegistry
where
    C: ImgurClient + 'static,
    S: TrackerStore + 'static,
{
    let mut registry = CommandRegistry::new();

    registry.register("track", tracking::TrackCommand::new(Arc::clone(&trackers)));
    registry.register("untrack", tracking::UntrackCommand::new(Arc::clone(&trackers)));
    registry.register("trackers", tracking::TrackersCommand::new(trackers));
    registry.register("findcomment", comments::FindCommentCommand::new(Arc::clone(&imgur)));
    registry.register("rating", comments::RatingCommand::new(imgur));

    let mut entries: Vec<(String, String)> = registry
        .catalog()
        .into_iter()
        .map(|(name, usage)| (name.to_string(), usage.to_string()))
        .collect();
    entries.push(("help".to_string(), help::HELP_USAGE.to_string()));
    registry.register("help", help::HelpCommand::new(entries, prefix));

    registry
}
