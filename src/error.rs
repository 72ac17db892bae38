use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("giving up after {failures} consecutive failed polls: {source}")]
    Escalated {
        failures: i64,
        #[source]
        source: Box<ExporterError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scrape server error: {0}")]
    Server(String),
}

impl ExporterError {
    /// True for the failure kinds a poll cycle may tolerate.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ExporterError::Transport(_) | ExporterError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
