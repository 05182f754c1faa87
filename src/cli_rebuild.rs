use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_library_server::library::restore_catalog;
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

/// Rebuilds the movie catalog database from the files and links found in a
/// library directory.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the library base directory, holding movies/, imports/ and the
    /// link directories.
    #[clap(value_parser = parse_path)]
    pub library_path: PathBuf,

    /// Path to the SQLite catalog database file to rebuild into.
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
    if catalog.movie_count()? > 0 {
        bail!(
            "Catalog at {:?} already contains movies, refusing to rebuild",
            cli_args.sqlite_path
        );
    }

    info!("Rebuilding catalog from library at {:?}", cli_args.library_path);
    let summary = restore_catalog(&catalog, &paths)?;
    info!(
        "Restored {} movies and {} properties",
        summary.movies, summary.properties
    );
    Ok(())
}
