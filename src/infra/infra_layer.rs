// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "tracking/mod.rs"]
pub mod tracking;

#[path = "imgur/mod.rs"]
pub mod imgur;

#[path = "config.rs"]
pub mod config;
