//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own library directory and
//! catalog database.

use super::constants::*;
use movie_library_server::catalog::PropertyKind;
use movie_library_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use movie_library_server::{LibraryPaths, MovieLibrary, SqliteCatalog};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance backed by an empty library in a temp directory
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Library handle for direct setup and assertions in tests
    pub library: MovieLibrary,

    /// Path resolution for filesystem assertions
    pub paths: LibraryPaths,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary library directory with the full layout
    /// 2. Opens a fresh SQLite catalog inside it
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Library or catalog creation fails
    /// - Port binding fails
    /// - Server doesn't become ready within timeout
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp library directory");
        let paths = LibraryPaths::new(temp_dir.path());
        paths
            .ensure_layout()
            .expect("Failed to create library layout");

        let catalog = SqliteCatalog::new(temp_dir.path().join("sqlite.db"))
            .expect("Failed to open catalog");
        let library = MovieLibrary::new(catalog, paths.clone());

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, library.clone()).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            library,
            paths,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Drops a file into imports/ so the next POST /movies picks it up
    pub fn add_import(&self, filename: &str) {
        std::fs::write(self.paths.imports_dir().join(filename), b"test movie data")
            .expect("Failed to write import file");
    }

    /// True when movies/ holds a file with this name
    pub fn movie_file_exists(&self, filename: &str) -> bool {
        self.paths.movie_path(filename).exists()
    }

    /// True when imports/ holds a file with this name
    pub fn import_file_exists(&self, filename: &str) -> bool {
        self.paths.imports_dir().join(filename).exists()
    }

    /// True when the link directory of `kind` holds `entity/filename`
    pub fn link_exists(&self, kind: PropertyKind, entity: &str, filename: &str) -> bool {
        let path = self.paths.link_dir(kind).join(entity).join(filename);
        std::fs::symlink_metadata(path).is_ok()
    }

    /// Waits for the server to become ready by polling the stats endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
