use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelAdapterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("message send failed: {0}")]
    SendFailed(String),

    #[error("message parse error: {0}")]
    ParseError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("event stream not running")]
    NotRunning,

    #[error("event stream already running")]
    AlreadyRunning,

    #[error("internal error: {0}")]
    Internal(String),
}
