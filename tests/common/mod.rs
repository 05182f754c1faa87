//! Shared harness for the end-to-end suites
//!
//! Everything a test needs comes through this module: the spawned server,
//! the typed HTTP client and the fixture constants.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, PLAIN_FILE};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_import() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     server.add_import(PLAIN_FILE);
//!     let response = client.import_movies().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
