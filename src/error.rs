use thiserror::Error;

/// Errors produced by catalog and library operations.
///
/// The first four variants carry a human readable message that is returned
/// verbatim in HTTP error bodies. `Database` wraps unexpected sqlite failures
/// that are not mapped to a more specific variant.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Constraint(String),

    #[error("{0}")]
    Path(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
