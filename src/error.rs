use thiserror::Error;

use crate::mapper::MappingError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A lookup-by-key that expects exactly one result found none.
    #[error("entity not found")]
    NotFound,

    #[error("configuration: {0}")]
    Config(String),

    /// A stored record does not conform to the expected shape.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Connection-level or query-level failure from the document store,
    /// propagated unchanged.
    #[error("document store failure: {0}")]
    Store(#[from] mongodb::error::Error),

    /// The external elevation provider failed; no retry is attempted.
    #[error("elevation provider failure: {0}")]
    Elevation(String),

    #[error("invalid gpx track: {0}")]
    Gpx(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
