use thiserror::Error;

/// Why a layout pass could not produce a usable placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("visible window [{start}, {end}] is empty")]
    EmptyWindow { start: f64, end: f64 },
    #[error("scale maps the window onto a zero-width pixel span")]
    DegenerateScale,
    #[error("scale produced a non-finite value for {what}")]
    NonFinite { what: String },
    #[error("minimum display width must be a finite, non-negative number (got {0})")]
    InvalidMinWidth(f64),
}

/// Failure to obtain records from a data source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("data source answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON from data source: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed table: {0}")]
    Table(#[from] csv::Error),
    #[error("data source has no namespace '{0}'")]
    UnknownNamespace(String),
    #[error("invalid data source URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum LocusError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("could not decode records for layer '{layer}': {source}")]
    Decode {
        layer: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no layer '{layer}' in panel '{panel}'")]
    UnknownLayer { panel: String, layer: String },
    #[error("y axis must be 1 or 2 (got {0})")]
    InvalidAxis(u8),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LocusError>;
