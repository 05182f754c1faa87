use axum::extract::FromRef;

use crate::library::MovieLibrary;
use std::time::Instant;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub library: MovieLibrary,
    pub hash: String,
}

impl FromRef<ServerState> for MovieLibrary {
    fn from_ref(input: &ServerState) -> Self {
        input.library.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
