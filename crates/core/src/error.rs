use thiserror::Error;

/// Error taxonomy for the control plane (spec §7). None of these abort the
/// process — every call site decides drop/log/flood based on the kind.
#[derive(Error, Debug)]
pub enum SdnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    #[error("malformed announcement: {0}")]
    MalformedAnnouncement(String),

    #[error("unknown host: {0}")]
    UnknownHost(String),

    #[error("unknown rank: {0}")]
    UnknownRank(i32),

    #[error("subscriber disconnected")]
    SubscriberDisconnected,

    #[error("subscriber sent an invalid reply: {0}")]
    SubscriberInvalidReply(String),

    #[error("switch disconnected: {0}")]
    SwitchDisconnected(u64),

    #[error("{0}")]
    Other(String),
}

pub type SdnResult<T> = Result<T, SdnError>;
