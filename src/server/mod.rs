pub mod config;
mod http_layers;
mod property_routes;
mod responses;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::run_server;
