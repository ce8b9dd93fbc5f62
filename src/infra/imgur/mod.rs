// Imgur infra layer.
// - `imgur_client.rs` talks to the Imgur HTTP API.

#[path = "imgur_client.rs"]
pub mod imgur_client;

pub use imgur_client::ImgurApiClient;
