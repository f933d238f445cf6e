//! Error types for the fallible edges of the crate.
//!
//! Resolution itself never fails; these cover configuration, HTTP client
//! construction and deep-link decoding.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("bad or empty link")]
    EmptyQueue,

    #[error("not a quad link: {0}")]
    NotQuad(String),
}

pub type Result<T> = std::result::Result<T, Error>;
