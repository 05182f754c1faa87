//! Orchestration of catalog mutations and their filesystem side effects.
//!
//! Every mutating operation runs under one library-wide lock so the
//! relational update and the file/link updates of one mutation never
//! interleave with another's. Reads go straight to the catalog.

use super::links::{ensure_movie_links, update_link};
use super::paths::{self, LibraryPaths};
use crate::catalog::{
    MovieDetails, MovieFile, MovieUpdate, NewMovie, Property, PropertyKind, SqliteCatalog,
};
use crate::error::{LibraryError, LibraryResult};
use crate::filename::{parse_filename, render_filename, sort_name, RenderInput};
use std::fs;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Names to unlink under when an entity rename has already been persisted
/// and the database no longer knows the old name. Entities without an entry
/// unlink under their current name.
#[derive(Debug, Default)]
struct PreviousNames {
    actor: Option<(usize, String)>,
    series: Option<String>,
    studio: Option<String>,
}

#[derive(Clone)]
pub struct MovieLibrary {
    catalog: SqliteCatalog,
    paths: LibraryPaths,
    mutation_lock: Arc<Mutex<()>>,
}

impl MovieLibrary {
    pub fn new(catalog: SqliteCatalog, paths: LibraryPaths) -> Self {
        MovieLibrary {
            catalog,
            paths,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn add_property(&self, kind: PropertyKind, name: &str) -> LibraryResult<Property> {
        let _guard = self.mutation_lock.lock().unwrap();
        let property = self.catalog.insert_property(kind, name)?;
        debug!(
            "Added new {} {}",
            kind.label().to_lowercase(),
            property.name
        );
        Ok(property)
    }

    pub fn all_properties(&self, kind: PropertyKind) -> LibraryResult<Vec<Property>> {
        self.catalog.all_properties(kind)
    }

    /// Rename a property and converge every affected movie: actors, series
    /// and studios appear in filenames, so each of their movies gets its
    /// canonical filename reapplied with the old name as the unlink target;
    /// category renames only repoint links.
    pub fn rename_property(
        &self,
        kind: PropertyKind,
        id: usize,
        new_name: &str,
    ) -> LibraryResult<Property> {
        let _guard = self.mutation_lock.lock().unwrap();
        let old = self.property_checked(kind, id)?;
        let renamed = self.catalog.rename_property(kind, id, new_name)?;
        for movie_id in self.catalog.movies_with_property(kind, id)? {
            let Some(mut movie) = self.catalog.get_movie(movie_id)? else {
                continue;
            };
            let previous = match kind {
                // Categories never appear in filenames, nothing to rename.
                PropertyKind::Category => None,
                PropertyKind::Actor => Some(PreviousNames {
                    actor: Some((id, old.name.clone())),
                    ..PreviousNames::default()
                }),
                PropertyKind::Series => Some(PreviousNames {
                    series: Some(old.name.clone()),
                    ..PreviousNames::default()
                }),
                PropertyKind::Studio => Some(PreviousNames {
                    studio: Some(old.name.clone()),
                    ..PreviousNames::default()
                }),
            };
            if let Some(previous) = &previous {
                self.apply_canonical_filename(&mut movie, previous)?;
            }
            // Repoint this property's own link. A no-op when the canonical
            // rename above already moved it, which it skips when the rendered
            // filename came out unchanged (actor list over the length cutoff).
            update_link(&self.paths, kind, &old.name, &movie.filename, false)?;
            update_link(&self.paths, kind, &renamed.name, &movie.filename, true)?;
        }
        debug!(
            "Renamed {} {} -> {}",
            kind.label().to_lowercase(),
            old.name,
            renamed.name
        );
        Ok(renamed)
    }

    pub fn delete_property(&self, kind: PropertyKind, id: usize) -> LibraryResult<String> {
        let _guard = self.mutation_lock.lock().unwrap();
        let name = self.catalog.delete_property(kind, id)?;
        debug!("Deleted {} {}", kind.label().to_lowercase(), name);
        Ok(name)
    }

    // =========================================================================
    // Movies
    // =========================================================================

    pub fn all_movies(&self) -> LibraryResult<Vec<MovieFile>> {
        self.catalog.all_movie_files()
    }

    pub fn get_movie(&self, id: usize) -> LibraryResult<MovieDetails> {
        self.movie_checked(id)
    }

    /// Import every file currently in imports/. Parsed studio, series and
    /// actor names are resolved against the existing catalog; unknown names
    /// are left for a human to assign later (the movie arrives unprocessed).
    /// The first failing file aborts the run, files imported before it stay
    /// imported.
    pub fn import_movies(&self) -> LibraryResult<Vec<MovieDetails>> {
        let _guard = self.mutation_lock.lock().unwrap();
        let files = paths::list_files(&self.paths.imports_dir())?;
        let mut imported = Vec::new();
        for file in files {
            if file == ".keep" {
                continue;
            }
            let parsed = parse_filename(&file);
            let mut studio_id = None;
            if let Some(name) = &parsed.studio {
                studio_id = self
                    .catalog
                    .find_property_by_name(PropertyKind::Studio, name)?
                    .map(|p| p.id);
            }
            let mut series_id = None;
            if let Some(name) = &parsed.series {
                series_id = self
                    .catalog
                    .find_property_by_name(PropertyKind::Series, name)?
                    .map(|p| p.id);
            }
            let mut actor_ids = Vec::new();
            for actor_name in parsed.actor_names() {
                if let Some(actor) = self
                    .catalog
                    .find_property_by_name(PropertyKind::Actor, &actor_name)?
                {
                    actor_ids.push(actor.id);
                }
            }
            self.paths.move_into_movies(&file)?;
            let movie = self.catalog.insert_movie(&NewMovie {
                filename: file,
                name: parsed.name,
                studio_id,
                series_id,
                series_number: parsed.series_number,
                actor_ids,
                category_ids: Vec::new(),
                processed: false,
            })?;
            ensure_movie_links(&self.paths, &movie)?;
            debug!("Imported movie {}", movie.filename);
            imported.push(movie);
        }
        Ok(imported)
    }

    /// Overwrite a movie's editable fields. Marks the movie processed even
    /// when nothing changed. Clearing series or studio removes that link
    /// under the previous name before the row is rewritten; every other link
    /// follows the canonical filename reapplication.
    pub fn update_movie(&self, id: usize, update: &MovieUpdate) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(id)?;
        let series_id_current = movie.series.as_ref().map(|p| p.id);
        let studio_id_current = movie.studio.as_ref().map(|p| p.id);
        if update.name == movie.name
            && update.series_id == series_id_current
            && update.series_number == movie.series_number
            && update.studio_id == studio_id_current
        {
            self.catalog.set_movie_processed(id, true)?;
            return self.movie_checked(id);
        }
        if let Some(series_id) = update.series_id {
            self.property_checked(PropertyKind::Series, series_id)?;
        }
        if let Some(studio_id) = update.studio_id {
            self.property_checked(PropertyKind::Studio, studio_id)?;
        }
        let new_sort_name = if update.name != movie.name {
            Some(sort_name(update.name.as_deref()))
        } else {
            movie.sort_name.clone()
        };
        let series_previous = movie.series.as_ref().map(|p| p.name.clone());
        let studio_previous = movie.studio.as_ref().map(|p| p.name.clone());
        if update.series_id != series_id_current && update.series_id.is_none() {
            if let Some(name) = &series_previous {
                update_link(&self.paths, PropertyKind::Series, name, &movie.filename, false)?;
            }
        }
        if update.studio_id != studio_id_current && update.studio_id.is_none() {
            if let Some(name) = &studio_previous {
                update_link(&self.paths, PropertyKind::Studio, name, &movie.filename, false)?;
            }
        }
        self.catalog
            .update_movie_row(id, update, new_sort_name.as_deref())?;
        let mut updated = self.movie_checked(id)?;
        let previous = PreviousNames {
            actor: None,
            series: series_previous,
            studio: studio_previous,
        };
        self.apply_canonical_filename(&mut updated, &previous)?;
        debug!("Updated movie {}", updated.filename);
        Ok(updated)
    }

    /// Delete a movie: its file moves back to imports/ first (a failed move
    /// leaves the catalog untouched), then all links go, then the row.
    pub fn delete_movie(&self, id: usize) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(id)?;
        self.paths.move_into_imports(&movie.filename)?;
        for actor in &movie.actors {
            update_link(&self.paths, PropertyKind::Actor, &actor.name, &movie.filename, false)?;
        }
        for category in &movie.categories {
            update_link(
                &self.paths,
                PropertyKind::Category,
                &category.name,
                &movie.filename,
                false,
            )?;
        }
        if let Some(series) = &movie.series {
            update_link(&self.paths, PropertyKind::Series, &series.name, &movie.filename, false)?;
        }
        if let Some(studio) = &movie.studio {
            update_link(&self.paths, PropertyKind::Studio, &studio.name, &movie.filename, false)?;
        }
        self.catalog.delete_movie_row(id)?;
        debug!("Deleted movie {}", movie.display_name());
        Ok(movie)
    }

    // =========================================================================
    // Relationship edges
    // =========================================================================

    pub fn add_movie_actor(&self, movie_id: usize, actor_id: usize) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(movie_id)?;
        let actor = self.property_checked(PropertyKind::Actor, actor_id)?;
        if movie.actors.iter().any(|a| a.id == actor_id) {
            return Err(LibraryError::Duplicate(format!(
                "Actor {} (ID {}) is already in movie {} (ID {})",
                actor.name,
                actor.id,
                movie.display_name(),
                movie.id
            )));
        }
        self.catalog.attach_actor(movie_id, actor_id)?;
        let mut updated = self.movie_checked(movie_id)?;
        self.apply_canonical_filename(&mut updated, &PreviousNames::default())?;
        update_link(&self.paths, PropertyKind::Actor, &actor.name, &updated.filename, true)?;
        debug!("Added actor {} to movie {}", actor.name, updated.display_name());
        Ok(updated)
    }

    pub fn remove_movie_actor(
        &self,
        movie_id: usize,
        actor_id: usize,
    ) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(movie_id)?;
        let actor = self.property_checked(PropertyKind::Actor, actor_id)?;
        if !movie.actors.iter().any(|a| a.id == actor_id) {
            return Err(LibraryError::NotFound(format!(
                "Actor {} (ID {}) is not in movie {} (ID {})",
                actor.name,
                actor.id,
                movie.display_name(),
                movie.id
            )));
        }
        self.catalog.detach_actor(movie_id, actor_id)?;
        update_link(&self.paths, PropertyKind::Actor, &actor.name, &movie.filename, false)?;
        let mut updated = self.movie_checked(movie_id)?;
        self.apply_canonical_filename(&mut updated, &PreviousNames::default())?;
        debug!(
            "Removed actor {} from movie {}",
            actor.name,
            updated.display_name()
        );
        Ok(updated)
    }

    pub fn add_movie_category(
        &self,
        movie_id: usize,
        category_id: usize,
    ) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(movie_id)?;
        let category = self.property_checked(PropertyKind::Category, category_id)?;
        if movie.categories.iter().any(|c| c.id == category_id) {
            return Err(LibraryError::Duplicate(format!(
                "Category {} (ID {}) is already in movie {} (ID {})",
                category.name,
                category.id,
                movie.display_name(),
                movie.id
            )));
        }
        self.catalog.attach_category(movie_id, category_id)?;
        update_link(&self.paths, PropertyKind::Category, &category.name, &movie.filename, true)?;
        debug!(
            "Added category {} to movie {}",
            category.name,
            movie.display_name()
        );
        self.movie_checked(movie_id)
    }

    pub fn remove_movie_category(
        &self,
        movie_id: usize,
        category_id: usize,
    ) -> LibraryResult<MovieDetails> {
        let _guard = self.mutation_lock.lock().unwrap();
        let movie = self.movie_checked(movie_id)?;
        let category = self.property_checked(PropertyKind::Category, category_id)?;
        if !movie.categories.iter().any(|c| c.id == category_id) {
            return Err(LibraryError::NotFound(format!(
                "Movie {} (ID {}) does not have category {} (ID {})",
                movie.display_name(),
                movie.id,
                category.name,
                category.id
            )));
        }
        self.catalog.detach_category(movie_id, category_id)?;
        update_link(&self.paths, PropertyKind::Category, &category.name, &movie.filename, false)?;
        debug!(
            "Removed category {} from movie {}",
            category.name,
            movie.display_name()
        );
        self.movie_checked(movie_id)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn movie_checked(&self, id: usize) -> LibraryResult<MovieDetails> {
        self.catalog
            .get_movie(id)?
            .ok_or_else(|| LibraryError::NotFound(format!("Movie ID {} does not exist", id)))
    }

    fn property_checked(&self, kind: PropertyKind, id: usize) -> LibraryResult<Property> {
        self.catalog
            .get_property(kind, id)?
            .ok_or_else(|| LibraryError::NotFound(format!("{} ID {} does not exist", kind, id)))
    }

    /// Rename the movie file to its canonical name and repoint every link.
    ///
    /// No-op when the canonical name already matches. On return the movie's
    /// `filename` field holds the new name. Link updates follow the physical
    /// rename; a failure partway leaves the row pointing at the renamed
    /// file, so a relink run converges the remaining links.
    fn apply_canonical_filename(
        &self,
        movie: &mut MovieDetails,
        previous: &PreviousNames,
    ) -> LibraryResult<()> {
        let actor_names: Vec<&str> = movie.actors.iter().map(|a| a.name.as_str()).collect();
        let new_filename = render_filename(&RenderInput {
            studio: movie.studio.as_ref().map(|p| p.name.as_str()),
            series: movie.series.as_ref().map(|p| p.name.as_str()),
            series_number: movie.series_number,
            name: movie.name.as_deref(),
            actors: actor_names,
            filename: &movie.filename,
        });
        if new_filename == movie.filename {
            return Ok(());
        }

        let current_path = self.paths.movie_path(&movie.filename);
        let new_path = self.paths.movie_path(&new_filename);
        if new_path.exists() {
            return Err(LibraryError::Path(format!(
                "Renaming {} -> {} conflicts with existing",
                movie.filename, new_filename
            )));
        }
        fs::rename(&current_path, &new_path).map_err(|_| {
            LibraryError::Path(format!(
                "An OS error occurred while renaming {} to {}",
                movie.filename, new_filename
            ))
        })?;
        self.catalog.set_movie_filename(movie.id, &new_filename)?;
        let filename_old = std::mem::replace(&mut movie.filename, new_filename);

        for actor in &movie.actors {
            let name_old = match &previous.actor {
                Some((changed_id, name)) if *changed_id == actor.id => name.as_str(),
                _ => actor.name.as_str(),
            };
            update_link(&self.paths, PropertyKind::Actor, name_old, &filename_old, false)?;
            update_link(&self.paths, PropertyKind::Actor, &actor.name, &movie.filename, true)?;
        }
        for category in &movie.categories {
            update_link(
                &self.paths,
                PropertyKind::Category,
                &category.name,
                &filename_old,
                false,
            )?;
            update_link(
                &self.paths,
                PropertyKind::Category,
                &category.name,
                &movie.filename,
                true,
            )?;
        }
        if let Some(series) = &movie.series {
            let name_old = previous.series.as_deref().unwrap_or(&series.name);
            update_link(&self.paths, PropertyKind::Series, name_old, &filename_old, false)?;
            update_link(&self.paths, PropertyKind::Series, &series.name, &movie.filename, true)?;
        }
        if let Some(studio) = &movie.studio {
            let name_old = previous.studio.as_deref().unwrap_or(&studio.name);
            update_link(&self.paths, PropertyKind::Studio, name_old, &filename_old, false)?;
            update_link(&self.paths, PropertyKind::Studio, &studio.name, &movie.filename, true)?;
        }
        Ok(())
    }
}
