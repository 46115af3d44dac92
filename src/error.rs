use thiserror::Error;

/// Failures reading or writing the key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Problems with the text a user wants to practice with.
/// These are the only errors shown to the user.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no content: enter text or pick a file to start practicing")]
    EmptyText,

    #[error("unsupported file type '{0}': please use a .txt or .pdf file")]
    UnsupportedFileType(String),

    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures talking to the optional remote sessions API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),
}
