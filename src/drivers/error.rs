use thiserror::Error;
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },
    #[error("word count mismatch: expected {expected} words, got {actual}")]
    FrameCount { expected: usize, actual: usize },
}
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: std::io::Error,
    },
    #[error("serial port {port} did not accept the initial flush: {source}")]
    Io {
        port: String,
        #[source]
        source: std::io::Error,
    },
}
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("no serial port is open")]
    NotConnected,
    #[error("device answered {received} of {expected} bytes before the timeout")]
    Timeout { received: usize, expected: usize },
    #[error("serial transport fault: {0}")]
    Io(#[from] std::io::Error),
}
/// Anything that abandons a single acquisition tick.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
