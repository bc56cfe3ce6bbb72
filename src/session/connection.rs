//! HTTP access to the server's session endpoints.

use crate::lyrics::ApiClient;
use crate::lyrics::types::http_client;
use crate::playback::Ticks;
use crate::session::metadata::SessionInfo;

/// Errors that can occur while talking to the session endpoints
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone)]
pub struct SessionClient {
    api: ApiClient,
}

impl SessionClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List sessions the configured user may control.
    pub async fn list_sessions(&self) -> Result<Vec<SessionInfo>, SessionError> {
        let url = self.api.url(&format!(
            "Sessions?ControllableByUserId={}",
            urlencoding::encode(self.api.user_id())
        ));
        let resp = http_client()
            .get(&url)
            .header("X-Emby-Token", self.api.token())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SessionError::Api(format!("sessions: HTTP {}", resp.status())));
        }
        Ok(resp.json().await?)
    }

    pub async fn seek(&self, session_id: &str, ticks: Ticks) -> Result<(), SessionError> {
        self.command(&format!(
            "Sessions/{}/Playing/Seek?SeekPositionTicks={}",
            urlencoding::encode(session_id),
            ticks.max(0)
        ))
        .await
    }

    pub async fn play_pause(&self, session_id: &str) -> Result<(), SessionError> {
        self.command(&format!(
            "Sessions/{}/Playing/PlayPause",
            urlencoding::encode(session_id)
        ))
        .await
    }

    async fn command(&self, path: &str) -> Result<(), SessionError> {
        let resp = http_client()
            .post(self.api.url(path))
            .header("X-Emby-Token", self.api.token())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SessionError::Api(format!("{path}: HTTP {}", resp.status())));
        }
        Ok(())
    }
}

/// Check if a session should be ignored.
///
/// Returns true if the client or device name (case-insensitive) contains any blocked string.
pub fn is_blocked(session: &SessionInfo, block_list: &[String]) -> bool {
    let client = session.client.to_lowercase();
    let device = session.device_name.to_lowercase();
    block_list.iter().any(|blocked| {
        let blocked = blocked.to_lowercase();
        !blocked.is_empty() && (client.contains(&blocked) || device.contains(&blocked))
    })
}
