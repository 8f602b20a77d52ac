//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The uevent socket could not be created
    #[error("Failed to open uevent channel: {0}")]
    ChannelOpen(#[source] std::io::Error),

    /// Joining the uevent multicast group failed, usually for lack of privilege
    #[error("Failed to bind uevent channel to group {groups:#x}: {source}")]
    ChannelBind {
        groups: u32,
        #[source]
        source: std::io::Error,
    },

    /// Reading from a bound channel failed
    #[error("Failed to receive uevent: {0}")]
    Receive(#[source] std::io::Error),

    /// The bridge between the receive thread and the reporter closed
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
