// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "comments/comment_search.rs"]
pub mod comments;

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "imgur/mod.rs"]
pub mod imgur;

#[path = "tracking/mod.rs"]
pub mod tracking;
