//! Remote session module: a playback manager that follows a server session.

pub mod connection;
pub mod events;
pub mod metadata;
pub mod playback;

pub use connection::{SessionClient, SessionError};
pub use events::{TICK_INTERVAL, watch_sessions};
pub use playback::RemotePlayback;
