use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// A selector the caller relies on without a presence check matched nothing.
    #[error("required element `{0}` not found in document")]
    MissingElement(&'static str),

    /// The document rejected a mutation (element creation, style write, append).
    #[error("dom operation failed: {0}")]
    Dom(String),

    #[error("invalid game snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
