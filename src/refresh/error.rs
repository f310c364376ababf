use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Feed not found")]
    NotFound,

    /// Network, status or parse failure for the feed document.
    #[error("Failed to fetch RSS feed: {0}")]
    Fetch(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// A failure that carries no usable description.
    #[error("unspecified refresh failure")]
    Unspecified,
}

impl RefreshError {
    /// Message fit for API callers; `None` when the error has nothing to say.
    pub fn message(&self) -> Option<String> {
        match self {
            RefreshError::Unspecified => None,
            other => Some(other.to_string()),
        }
    }
}
