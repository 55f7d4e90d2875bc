use thiserror::Error;

/// Error type for a failed emissions run.
///
/// Every variant is fatal: no field is written once one of these is raised.
#[derive(Error, Debug)]
pub enum McbError {
    #[error("Invalid region {region}: {reason}")]
    InvalidRegion { region: String, reason: String },
    #[error("Region {region} does not select any grid cell")]
    EmptyRegion { region: String },
    #[error("Grid mismatch between {left} and {right}: {details}")]
    GridMismatch {
        left: String,
        right: String,
        details: String,
    },
    #[error("Non-finite {quantity} for {context}: {value}")]
    NonFiniteResult {
        quantity: String,
        context: String,
        value: f64,
    },
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not decode {path}: {details}")]
    Format { path: String, details: String },
}

/// Convenience type for `Result<T, McbError>`.
pub type McbResult<T> = Result<T, McbError>;
