//! Movie Library Server Library
//!
//! This library exposes the internal modules for the server and CLI binaries.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filename;
pub mod library;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog::SqliteCatalog;
pub use error::{LibraryError, LibraryResult};
pub use library::{LibraryPaths, MovieLibrary};
pub use server::{run_server, RequestsLoggingLevel};
