use thiserror::Error;

use crate::spec::ParameterLocation;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to read OpenAPI document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid OpenAPI document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("OpenAPI document declares no servers")]
    NoServer,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Missing path parameter '{name}' for operation {operation}")]
    MissingPathParameter { operation: String, name: String },

    #[error("Missing required {location} parameter '{name}' for operation {operation}")]
    MissingRequiredParameter {
        operation: String,
        name: String,
        location: ParameterLocation,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
