//! Fixture constants for the end-to-end suites
//!
//! Filenames, the values parsed out of them, and harness timeouts live
//! here so a change to test data touches one file.

// ============================================================================
// Test Movie Filenames
// ============================================================================

/// A bare filename with no parseable annotations
pub const PLAIN_FILE: &str = "Serpico.mp4";

/// Movie name parsed from PLAIN_FILE
pub const PLAIN_NAME: &str = "Serpico";

/// A fully annotated filename: studio, series with number, name and two actors
pub const ANNOTATED_FILE: &str =
    "[Paramount] {The Godfather 1} The Godfather (Al Pacino, Marlon Brando).mp4";

/// Movie name parsed from ANNOTATED_FILE
pub const ANNOTATED_NAME: &str = "The Godfather";

/// Studio parsed from ANNOTATED_FILE
pub const ANNOTATED_STUDIO: &str = "Paramount";

/// Series parsed from ANNOTATED_FILE
pub const ANNOTATED_SERIES: &str = "The Godfather";

/// First actor parsed from ANNOTATED_FILE
pub const ACTOR_1_NAME: &str = "Al Pacino";

/// Second actor parsed from ANNOTATED_FILE
pub const ACTOR_2_NAME: &str = "Marlon Brando";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
