// Core Imgur module - the port the infra client implements, error
// classification, ratings, and the service built on top of them.

pub mod imgur_models;
pub mod imgur_service;
pub mod rating;

pub use imgur_models::*;
pub use imgur_service::ImgurService;
