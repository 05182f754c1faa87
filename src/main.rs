use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_library_server::config::{AppConfig, CliConfig, FileConfig};
use movie_library_server::{
    run_server, LibraryPaths, MovieLibrary, RequestsLoggingLevel, SqliteCatalog,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the library base directory, holding movies/, imports/ and the
    /// link directories.
    #[clap(long, value_parser = parse_path)]
    pub library_path: Option<PathBuf>,

    /// Path to the SQLite catalog database file. Defaults to sqlite.db inside
    /// the library directory.
    #[clap(long, value_parser = parse_path)]
    pub sqlite_path: Option<PathBuf>,

    /// Path to a TOML config file. Values set there override the command line.
    #[clap(short, long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        library_path: cli_args.library_path,
        sqlite_path: cli_args.sqlite_path,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let paths = LibraryPaths::new(&config.library_path);
    paths.ensure_layout()?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        config.sqlite_path
    );
    let catalog = SqliteCatalog::new(&config.sqlite_path)?;
    let library = MovieLibrary::new(catalog, paths);

    info!("Serving library at {:?}", config.library_path);
    info!("Ready to serve at port {}!", config.port);
    run_server(library, config.logging_level, config.port).await
}
