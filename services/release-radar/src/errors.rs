//!
//! src/errors.rs
//!
//! Defines enums and methods of error conversion
//! for errors the release radar uses
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<serde_json::Error> for RadarError {
    fn from(e: serde_json::Error) -> Self { RadarError::Parse(e.to_string()) }
}
