//! Symlink maintenance for the per-kind link directories.
//!
//! Each (property, movie) association is mirrored as
//! `<kind>/<property name>/<movie filename>` pointing at the relative target
//! `../../movies/<movie filename>`. The link directories sit beside `movies/`
//! under the library base, so the relative target resolves from inside any
//! property subdirectory.

use super::paths::{LibraryPaths, MOVIES_DIR};
use crate::catalog::{MovieDetails, PropertyKind};
use crate::error::{LibraryError, LibraryResult};
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;
use tracing::{debug, warn};

/// Create (`selected == true`) or remove (`selected == false`) the link for
/// one association. Both directions are idempotent. Removing the last link
/// of a property also removes its now-empty subdirectory, best-effort.
pub fn update_link(
    paths: &LibraryPaths,
    kind: PropertyKind,
    name: &str,
    filename: &str,
    selected: bool,
) -> LibraryResult<()> {
    let target = format!("../../{}/{}", MOVIES_DIR, filename);
    let property_dir = paths.link_dir(kind).join(name);
    let link_path = property_dir.join(filename);

    if selected {
        if !property_dir.is_dir() {
            fs::create_dir_all(&property_dir).map_err(|_| {
                LibraryError::Path(format!(
                    "Link directory {} could not be created",
                    property_dir.display()
                ))
            })?;
        }
        if !link_exists(&link_path) {
            symlink(&target, &link_path).map_err(|_| {
                LibraryError::Path(format!(
                    "Link {} -> {} could not be created",
                    target,
                    link_path.display()
                ))
            })?;
        }
    } else if link_exists(&link_path) {
        fs::remove_file(&link_path).map_err(|_| {
            LibraryError::Path(format!(
                "Link {} -> {} could not be removed",
                target,
                link_path.display()
            ))
        })?;
        // The directory stays while other links remain in it.
        if let Err(e) = fs::remove_dir(&property_dir) {
            match e.kind() {
                io::ErrorKind::DirectoryNotEmpty | io::ErrorKind::NotFound => {
                    debug!("Keeping link directory {}: {}", property_dir.display(), e)
                }
                _ => warn!(
                    "Could not remove link directory {}: {}",
                    property_dir.display(),
                    e
                ),
            }
        }
    }
    Ok(())
}

/// Create every link implied by the movie's current associations.
pub fn ensure_movie_links(paths: &LibraryPaths, movie: &MovieDetails) -> LibraryResult<()> {
    for actor in &movie.actors {
        update_link(paths, PropertyKind::Actor, &actor.name, &movie.filename, true)?;
    }
    for category in &movie.categories {
        update_link(
            paths,
            PropertyKind::Category,
            &category.name,
            &movie.filename,
            true,
        )?;
    }
    if let Some(series) = &movie.series {
        update_link(paths, PropertyKind::Series, &series.name, &movie.filename, true)?;
    }
    if let Some(studio) = &movie.studio {
        update_link(paths, PropertyKind::Studio, &studio.name, &movie.filename, true)?;
    }
    Ok(())
}

// Dangling symlinks count as present, `Path::exists` would follow them.
fn link_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
