//! Error taxonomy shared across every noetic crate.
//!
//! Mirrors the kind-not-type-name taxonomy of the core spec: each variant
//! is a propagation class, not a wrapper around one failing library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("fetch failed: {0}")]
    FetchFailure(String),

    #[error("store failure: {0}")]
    StoreFailure(String),

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("other: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Best-effort HTTP-equivalent status for transports that want one.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::NotFound(_) => 404,
            Error::RateLimited(_) => 429,
            Error::Cancelled => 499,
            Error::FetchFailure(_) | Error::StoreFailure(_) | Error::ProviderUnavailable(_) => 502,
            Error::Io(_) | Error::Serialization(_) | Error::Config(_) | Error::Other(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
