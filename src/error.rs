use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid source URL '{url}': {reason}")]
    MalformedSource { url: String, reason: String },

    #[error("Source unreachable: {0}")]
    UnreachableSource(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid selector for {field}: '{selector}'")]
    InvalidSelector { field: &'static str, selector: String },

    #[error("Element for {field} not found ({selector}); page layout may have changed")]
    ElementNotFound { field: &'static str, selector: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("No readings stored")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Fallback read failed: {0}")]
    Storage(#[from] StorageError),
}
