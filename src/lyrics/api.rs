use std::collections::HashMap;
use std::future::Future;

use crate::lyrics::types::{LyricLine, LyricsError, LyricsResponse, http_client};

/// Resolves the lyrics of one item on one server.
pub trait LyricsApi: Send + Sync + 'static {
    fn get_lyrics(
        &self,
        server_id: &str,
        item_id: &str,
    ) -> impl Future<Output = Result<Vec<LyricLine>, LyricsError>> + Send;
}

/// Authenticated client for a single server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    user_id: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, user_id: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            token: token.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn lyrics_url(&self, item_id: &str) -> String {
        self.url(&format!(
            "Users/{}/Items/{}/Lyrics",
            urlencoding::encode(&self.user_id),
            urlencoding::encode(item_id)
        ))
    }

    /// Fetch lyrics for an item.
    ///
    /// A 404 or a payload without lyric lines is reported as [`LyricsError::Empty`].
    pub async fn fetch_lyrics(&self, item_id: &str) -> Result<Vec<LyricLine>, LyricsError> {
        let url = self.lyrics_url(item_id);
        let resp = http_client()
            .get(&url)
            .header("X-Emby-Token", &self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Err(LyricsError::Empty);
        }

        if !resp.status().is_success() {
            return Err(LyricsError::Api(format!("lyrics: HTTP {}", resp.status())));
        }

        let body = resp.text().await?;
        let response: LyricsResponse = serde_json::from_str(&body)?;
        response.into_lines()
    }
}

/// Per-server API clients, looked up by server id.
///
/// A registry with a single client answers for every server id, since the
/// server id is only known once a session reports its now-playing item.
#[derive(Debug, Default)]
pub struct ServerConnections {
    clients: HashMap<String, ApiClient>,
    fallback: Option<ApiClient>,
}

impl ServerConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(client: ApiClient) -> Self {
        Self {
            clients: HashMap::new(),
            fallback: Some(client),
        }
    }

    pub fn insert(&mut self, server_id: &str, client: ApiClient) {
        self.clients.insert(server_id.to_string(), client);
    }

    pub fn api_client(&self, server_id: &str) -> Option<&ApiClient> {
        self.clients.get(server_id).or(self.fallback.as_ref())
    }
}

impl LyricsApi for ServerConnections {
    fn get_lyrics(
        &self,
        server_id: &str,
        item_id: &str,
    ) -> impl Future<Output = Result<Vec<LyricLine>, LyricsError>> + Send {
        let client = self.api_client(server_id).cloned();
        let server_id = server_id.to_string();
        let item_id = item_id.to_string();
        async move {
            let client = client.ok_or(LyricsError::UnknownServer(server_id))?;
            client.fetch_lyrics(&item_id).await
        }
    }
}
