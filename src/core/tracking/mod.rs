// Core tracking module - trackers, permission levels and the service that
// manages them.

pub mod tracking_models;
pub mod tracking_service;

pub use tracking_models::*;
pub use tracking_service::*;
