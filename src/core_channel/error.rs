use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    /// A write or wait was attempted on a channel that is no longer open.
    #[error("control channel is not open")]
    NotOpen,

    #[error("I/O error on control channel: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS handshake did not complete: {0}")]
    Handshake(std::io::Error),

    /// AUTH TLS on a channel whose security was already established.
    #[error("control channel is already secure")]
    AlreadySecure,
}
