//! Library directory layout and file moves between imports/ and movies/.

use crate::catalog::PropertyKind;
use crate::error::{LibraryError, LibraryResult};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MOVIES_DIR: &str = "movies";
pub const IMPORTS_DIR: &str = "imports";

/// Resolves every path inside the managed library tree: the movie files
/// directory, the imports intake directory and one link directory per
/// property kind, all directly under the library base.
#[derive(Clone, Debug)]
pub struct LibraryPaths {
    base: PathBuf,
}

impl LibraryPaths {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        LibraryPaths { base: base.into() }
    }

    /// Create any missing subdirectory of the library tree.
    pub fn ensure_layout(&self) -> Result<()> {
        let mut dirs = vec![self.movies_dir(), self.imports_dir()];
        for kind in PropertyKind::ALL {
            dirs.push(self.link_dir(kind));
        }
        for dir in dirs {
            fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create library directory {}", dir.display())
            })?;
        }
        Ok(())
    }

    pub fn movies_dir(&self) -> PathBuf {
        self.base.join(MOVIES_DIR)
    }

    pub fn imports_dir(&self) -> PathBuf {
        self.base.join(IMPORTS_DIR)
    }

    /// Link directory for a property kind, named after its table.
    pub fn link_dir(&self, kind: PropertyKind) -> PathBuf {
        self.base.join(kind.table())
    }

    pub fn movie_path(&self, filename: &str) -> PathBuf {
        self.movies_dir().join(filename)
    }

    /// Move a file from imports/ into movies/.
    pub fn move_into_movies(&self, filename: &str) -> LibraryResult<()> {
        migrate(&self.imports_dir(), &self.movies_dir(), filename)
    }

    /// Move a file from movies/ back into imports/.
    pub fn move_into_imports(&self, filename: &str) -> LibraryResult<()> {
        migrate(&self.movies_dir(), &self.imports_dir(), filename)
    }
}

fn migrate(src_dir: &Path, dest_dir: &Path, filename: &str) -> LibraryResult<()> {
    let src = src_dir.join(filename);
    let dest = dest_dir.join(filename);
    if dest.exists() {
        return Err(LibraryError::Path(format!(
            "Moving {} to {} conflicts with existing",
            filename,
            dest_dir.display()
        )));
    }
    fs::rename(&src, &dest).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::NotFound => {
                format!("File {} not found in {}", filename, src_dir.display())
            }
            io::ErrorKind::PermissionDenied => format!(
                "No permission to move {} from {} to {}",
                filename,
                src_dir.display(),
                dest_dir.display()
            ),
            _ => format!(
                "An OS error occurred while moving {} from {} to {}",
                filename,
                src_dir.display(),
                dest_dir.display()
            ),
        };
        LibraryError::Path(message)
    })
}

/// List the entries of a directory, sorted by name.
pub fn list_files(path: &Path) -> LibraryResult<Vec<String>> {
    let entries = fs::read_dir(path).map_err(|e| list_error(path, &e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| list_error(path, &e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

fn list_error(path: &Path, e: &io::Error) -> LibraryError {
    let message = match e.kind() {
        io::ErrorKind::NotFound => format!("Directory {} does not exist", path.display()),
        io::ErrorKind::PermissionDenied => {
            format!("No permission to list files in {}", path.display())
        }
        io::ErrorKind::NotADirectory => format!("{} is not a directory", path.display()),
        _ => format!(
            "An OS error occurred while listing files in {}",
            path.display()
        ),
    };
    LibraryError::Path(message)
}
