//! Disaster recovery for the catalog and its link mirror.
//!
//! [`restore_catalog`] rebuilds an empty database from the files on disk,
//! treating link directories as the primary evidence and parsed filenames
//! as the fallback. [`relink_library`] goes the other way and reconciles
//! the link directories with whatever the database says.

use super::links::ensure_movie_links;
use super::paths::{self, LibraryPaths};
use crate::catalog::{MovieDetails, NewMovie, PropertyKind, SqliteCatalog};
use crate::error::LibraryResult;
use crate::filename::{parse_filename, ParsedFilename};
use std::collections::{HashMap, HashSet};
use std::fs;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct RestoreSummary {
    pub movies: usize,
    pub properties: usize,
}

#[derive(Debug, Default)]
pub struct RelinkSummary {
    pub pruned: usize,
    pub movies: usize,
}

/// Entity names of one kind gathered while scanning, in discovery order.
/// Names coming from links are recorded before names parsed out of
/// filenames, so when a movie ends up with conflicting candidates for a
/// single-valued field the link wins.
#[derive(Debug, Default)]
struct KindNames {
    names: Vec<String>,
    by_movie: HashMap<String, Vec<String>>,
}

impl KindNames {
    fn associate(&mut self, filename: &str, name: &str) {
        self.names.push(name.to_string());
        self.by_movie
            .entry(filename.to_string())
            .or_default()
            .push(name.to_string());
    }

    fn first_for(&self, filename: &str) -> Option<&String> {
        self.by_movie.get(filename).and_then(|names| names.first())
    }

    fn unique_ids_for(&self, filename: &str, ids: &HashMap<String, usize>) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if let Some(names) = self.by_movie.get(filename) {
            for name in names {
                if seen.insert(name.as_str()) {
                    if let Some(id) = ids.get(name) {
                        out.push(*id);
                    }
                }
            }
        }
        out
    }
}

/// Rebuild the catalog from the library directories. The movies listing is
/// the one fatal failure; unreadable link directories only cost their
/// associations. Every restored movie arrives processed, and its links are
/// recreated so the mirror matches the freshly written rows.
pub fn restore_catalog(
    catalog: &SqliteCatalog,
    paths: &LibraryPaths,
) -> anyhow::Result<RestoreSummary> {
    let mut movie_files = paths::list_files(&paths.movies_dir())?;
    movie_files.retain(|f| f != ".keep");
    let movie_set: HashSet<&str> = movie_files.iter().map(String::as_str).collect();

    let mut actors = scan_link_dir(paths, PropertyKind::Actor, &movie_set);
    let mut categories = scan_link_dir(paths, PropertyKind::Category, &movie_set);
    let mut series = scan_link_dir(paths, PropertyKind::Series, &movie_set);
    let mut studios = scan_link_dir(paths, PropertyKind::Studio, &movie_set);

    let parsed_files: Vec<ParsedFilename> =
        movie_files.iter().map(|f| parse_filename(f)).collect();
    for (file, parsed) in movie_files.iter().zip(&parsed_files) {
        for actor in parsed.actor_names() {
            actors.associate(file, &actor);
        }
        if let Some(name) = &parsed.series {
            series.associate(file, name);
        }
        if let Some(name) = &parsed.studio {
            studios.associate(file, name);
        }
    }

    let actor_ids = restore_properties(catalog, PropertyKind::Actor, &actors.names)?;
    let category_ids = restore_properties(catalog, PropertyKind::Category, &categories.names)?;
    let series_ids = restore_properties(catalog, PropertyKind::Series, &series.names)?;
    let studio_ids = restore_properties(catalog, PropertyKind::Studio, &studios.names)?;

    let mut summary = RestoreSummary {
        movies: 0,
        properties: actor_ids.len() + category_ids.len() + series_ids.len() + studio_ids.len(),
    };
    for (file, parsed) in movie_files.iter().zip(&parsed_files) {
        let movie = catalog.insert_movie(&NewMovie {
            filename: file.clone(),
            name: parsed.name.clone(),
            studio_id: studios
                .first_for(file)
                .and_then(|name| studio_ids.get(name).copied()),
            series_id: series
                .first_for(file)
                .and_then(|name| series_ids.get(name).copied()),
            series_number: parsed.series_number,
            actor_ids: actors.unique_ids_for(file, &actor_ids),
            category_ids: categories.unique_ids_for(file, &category_ids),
            processed: true,
        })?;
        ensure_movie_links(paths, &movie)?;
        info!("Restored movie {}", movie.filename);
        summary.movies += 1;
    }
    Ok(summary)
}

/// Walk one link directory and record which entity owns which movie files.
/// A link file that does not match anything in movies/ is reported and
/// skipped, but its entity directory still names a property worth keeping.
fn scan_link_dir(
    paths: &LibraryPaths,
    kind: PropertyKind,
    movie_set: &HashSet<&str>,
) -> KindNames {
    let mut scan = KindNames::default();
    let dir = paths.link_dir(kind);
    let entities = match paths::list_files(&dir) {
        Ok(entities) => {
            info!("Loaded {} from link directory {}", kind.table(), dir.display());
            entities
        }
        Err(e) => {
            warn!(
                "Failed to load {} from link directory {}: {}",
                kind.table(),
                dir.display(),
                e
            );
            return scan;
        }
    };
    for entity in entities {
        let entity_dir = dir.join(&entity);
        let files = match paths::list_files(&entity_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Unable to read files in {}: {}", entity_dir.display(), e);
                continue;
            }
        };
        scan.names.push(entity.clone());
        for file in files {
            if movie_set.contains(file.as_str()) {
                scan.associate(&file, &entity);
            } else {
                warn!("Broken link file {}/{}", entity_dir.display(), file);
            }
        }
    }
    scan
}

fn restore_properties(
    catalog: &SqliteCatalog,
    kind: PropertyKind,
    names: &[String],
) -> LibraryResult<HashMap<String, usize>> {
    let mut unique: Vec<&String> = names
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    unique.sort();
    let mut by_name = HashMap::new();
    for name in unique {
        let property = catalog.insert_property(kind, name)?;
        by_name.insert(property.name, property.id);
    }
    info!("Restored {} {}", by_name.len(), kind.table());
    Ok(by_name)
}

/// Bring the link directories in line with the catalog: remove links and
/// entity directories nothing in the database implies, then recreate every
/// link the database does imply.
pub fn relink_library(
    catalog: &SqliteCatalog,
    paths: &LibraryPaths,
) -> anyhow::Result<RelinkSummary> {
    let files = catalog.all_movie_files()?;
    let mut movies = Vec::with_capacity(files.len());
    for file in &files {
        if let Some(movie) = catalog.get_movie(file.id)? {
            movies.push(movie);
        }
    }

    let mut summary = RelinkSummary::default();
    for kind in PropertyKind::ALL {
        summary.pruned += prune_kind(paths, kind, &movies);
    }
    for movie in &movies {
        ensure_movie_links(paths, movie)?;
        summary.movies += 1;
    }
    Ok(summary)
}

fn prune_kind(paths: &LibraryPaths, kind: PropertyKind, movies: &[MovieDetails]) -> usize {
    let mut desired: HashMap<&str, HashSet<&str>> = HashMap::new();
    for movie in movies {
        let names: Vec<&str> = match kind {
            PropertyKind::Actor => movie.actors.iter().map(|p| p.name.as_str()).collect(),
            PropertyKind::Category => movie.categories.iter().map(|p| p.name.as_str()).collect(),
            PropertyKind::Series => movie.series.iter().map(|p| p.name.as_str()).collect(),
            PropertyKind::Studio => movie.studio.iter().map(|p| p.name.as_str()).collect(),
        };
        for name in names {
            desired
                .entry(name)
                .or_default()
                .insert(movie.filename.as_str());
        }
    }

    let dir = paths.link_dir(kind);
    let mut pruned = 0;
    let entities = match paths::list_files(&dir) {
        Ok(entities) => entities,
        Err(e) => {
            warn!("Failed to list link directory {}: {}", dir.display(), e);
            return pruned;
        }
    };
    for entity in entities {
        let entity_dir = dir.join(&entity);
        let files = match paths::list_files(&entity_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Unable to read files in {}: {}", entity_dir.display(), e);
                continue;
            }
        };
        let wanted = desired.get(entity.as_str());
        for file in files {
            if wanted.map_or(false, |w| w.contains(file.as_str())) {
                continue;
            }
            let link_path = entity_dir.join(&file);
            match fs::remove_file(&link_path) {
                Ok(()) => {
                    info!("Removed stale link {}", link_path.display());
                    pruned += 1;
                }
                Err(e) => warn!("Could not remove stale link {}: {}", link_path.display(), e),
            }
        }
        if wanted.is_none() {
            if let Err(e) = fs::remove_dir(&entity_dir) {
                warn!("Could not remove link directory {}: {}", entity_dir.display(), e);
            }
        }
    }
    pruned
}
