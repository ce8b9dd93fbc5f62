use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::comments::CommentNode;
use crate::core::imgur::{ImgurAccount, ImgurClient, ImgurError, ImgurPost};

/// Minimal Imgur API v3 client. It only exposes the calls the core layer needs.
///
/// Failed responses are classified by status code right here, before anything
/// else sees them.
#[derive(Clone)]
pub struct ImgurApiClient {
    client: Client,
    base_url: Url,
}

impl ImgurApiClient {
    pub fn new(client_id: &str) -> Result<Self, ImgurError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Client-ID {}", client_id))
                .map_err(|e| ImgurError::Transport(e.to_string()))?,
        );
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("ImgurTrackerBot/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ImgurError::Transport(e.to_string()))?;

        let base_url = Url::parse("https://api.imgur.com/3")
            .map_err(|e| ImgurError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Append each segment as a single percent-encoded path segment, so ids can
    /// never add segments, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ImgurError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ImgurError::Transport("Imgur base URL cannot take a path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        context: String,
    ) -> Result<T, ImgurError> {
        let url = self.endpoint(segments)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImgurError::Transport(e.to_string()))?;

        Self::read_envelope(resp, context).await
    }

    async fn read_envelope<T: DeserializeOwned>(resp: Response, context: String) -> Result<T, ImgurError> {
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %context, "Imgur request failed");
            return Err(ImgurError::from_status(status.as_u16(), context));
        }

        let envelope: ApiEnvelope<T> = resp
            .json()
            .await
            .map_err(|e| ImgurError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    fn map_comment(api: ApiComment) -> CommentNode {
        CommentNode::new(
            api.id,
            api.children.into_iter().map(Self::map_comment).collect(),
        )
    }

    fn map_post(api: ApiGalleryItem) -> ImgurPost {
        ImgurPost {
            id: api.id,
            nsfw: api.nsfw.unwrap_or(false),
            tags: api
                .tags
                .unwrap_or_default()
                .into_iter()
                .filter_map(|t| t.name)
                .collect(),
        }
    }
}

#[async_trait]
impl ImgurClient for ImgurApiClient {
    async fn get_account(&self, username: &str) -> Result<ImgurAccount, ImgurError> {
        let account: ApiAccount = self
            .get_data(&["account", username], format!("account {}", username))
            .await?;

        Ok(ImgurAccount {
            id: account.id,
            name: account.url.unwrap_or_else(|| username.to_string()),
        })
    }

    async fn get_post(&self, post_id: &str) -> Result<ImgurPost, ImgurError> {
        let item: ApiGalleryItem = self
            .get_data(&["gallery", post_id], format!("post {}", post_id))
            .await?;
        Ok(Self::map_post(item))
    }

    async fn get_comments(&self, post_id: &str) -> Result<Vec<CommentNode>, ImgurError> {
        let comments: Vec<ApiComment> = self
            .get_data(
                &["gallery", post_id, "comments"],
                format!("comments of post {}", post_id),
            )
            .await?;
        Ok(comments.into_iter().map(Self::map_comment).collect())
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApiAccount {
    id: u64,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiGalleryItem {
    id: String,
    nsfw: Option<bool>,
    tags: Option<Vec<ApiTag>>,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiComment {
    id: u64,
    #[serde(default)]
    children: Vec<ApiComment>,
}
