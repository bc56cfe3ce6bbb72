// lyrics/mod.rs - lyric types and the server lyrics endpoint
pub mod api;
pub mod types;

pub use api::{ApiClient, LyricsApi, ServerConnections};
pub use types::{LyricLine, LyricsError};
