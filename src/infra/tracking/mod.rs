// Implementations for the tracking system.

pub mod in_memory;

pub use in_memory::InMemoryTrackerStore;
