use crate::playback::Ticks;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("lyricsview/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

/// One lyric line. `start` is present only for time-synced lyrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LyricLine {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub start: Option<Ticks>,
}

impl LyricLine {
    pub fn timed(text: impl Into<String>, start: Ticks) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
        }
    }
}

/// Body of the lyrics endpoint. Other fields the server sends are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LyricsResponse {
    #[serde(default)]
    pub lyrics: Option<Vec<LyricLine>>,
}

impl LyricsResponse {
    /// A missing, null or empty `Lyrics` field counts as "no lyrics".
    pub fn into_lines(self) -> Result<Vec<LyricLine>, LyricsError> {
        match self.lyrics {
            Some(lines) if !lines.is_empty() => Ok(lines),
            _ => Err(LyricsError::Empty),
        }
    }
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Item has no lyrics")]
    Empty,
    #[error("No connection for server {0}")]
    UnknownServer(String),
}

pub(crate) fn http_client() -> &'static Client {
    &HTTP_CLIENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timed_and_plain_lines() {
        let body = r#"{"Metadata":{"Artist":"x"},"Lyrics":[{"Text":"one","Start":0},{"Text":"two"}]}"#;
        let resp: LyricsResponse = serde_json::from_str(body).unwrap();
        let lines = resp.into_lines().unwrap();
        assert_eq!(lines, vec![LyricLine::timed("one", 0), LyricLine::plain("two")]);
    }

    #[test]
    fn missing_or_empty_lyrics_is_an_error() {
        for body in [r#"{}"#, r#"{"Lyrics":null}"#, r#"{"Lyrics":[]}"#] {
            let resp: LyricsResponse = serde_json::from_str(body).unwrap();
            assert!(matches!(resp.into_lines(), Err(LyricsError::Empty)), "{body}");
        }
    }
}
