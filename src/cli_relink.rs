use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_library_server::library::relink_library;
use movie_library_server::{LibraryPaths, SqliteCatalog};

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

/// Synchronizes the link directories of a library with the catalog database,
/// removing stale links and recreating missing ones.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the library base directory, holding movies/, imports/ and the
    /// link directories.
    #[clap(value_parser = parse_path)]
    pub library_path: PathBuf,

    /// Path to the SQLite catalog database file.
    #[clap(value_parser = parse_path)]
    pub sqlite_path: PathBuf,
}

fn main() -> Result<()> {
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

    let paths = LibraryPaths::new(&cli_args.library_path);
    paths.ensure_layout()?;

    let catalog = SqliteCatalog::new(&cli_args.sqlite_path)?;

    info!("Relinking library at {:?}", cli_args.library_path);
    let summary = relink_library(&catalog, &paths)?;
    info!(
        "Removed {} stale links, refreshed links for {} movies",
        summary.pruned, summary.movies
    );
    Ok(())
}
