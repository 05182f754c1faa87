//! SQLite-backed catalog store.
//!
//! All access goes through a single guarded connection. Constraint failures
//! are mapped to domain errors carrying the message returned to clients,
//! everything else surfaces as [`LibraryError::Database`].

use super::models::{MovieDetails, MovieFile, MovieUpdate, NewMovie, Property, PropertyKind};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use crate::error::{LibraryError, LibraryResult};
use crate::filename::sort_name;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

impl SqliteCatalog {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open catalog database")?
        } else {
            let conn = Connection::open(db_path).context("Failed to create catalog database")?;
            CATALOG_VERSIONED_SCHEMAS.last().unwrap().create(&conn)?;
            conn
        };

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        if db_version >= CATALOG_VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        }
        let version = db_version as usize;
        CATALOG_VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;

        let movie_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))
            .unwrap_or(0);
        let actor_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM actors", [], |r| r.get(0))
            .unwrap_or(0);
        let category_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened movie catalog: {} movies, {} actors, {} categories",
            movie_count, actor_count, category_count
        );

        Ok(SqliteCatalog {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn insert_property(&self, kind: PropertyKind, name: &str) -> LibraryResult<Property> {
        let conn = self.conn.lock().unwrap();
        let result = if kind.has_sort_name() {
            conn.execute(
                &format!(
                    "INSERT INTO {} (name, sort_name) VALUES (?1, ?2)",
                    kind.table()
                ),
                params![name, sort_name(Some(name))],
            )
        } else {
            conn.execute(
                &format!("INSERT INTO {} (name) VALUES (?1)", kind.table()),
                params![name],
            )
        };
        match result {
            Ok(_) => Ok(Property {
                id: conn.last_insert_rowid() as usize,
                name: name.to_string(),
            }),
            Err(e) if is_unique_violation(&e) => Err(LibraryError::Duplicate(format!(
                "{} {} already exists",
                kind, name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_property(&self, kind: PropertyKind, id: usize) -> LibraryResult<Option<Property>> {
        let conn = self.conn.lock().unwrap();
        Self::get_property_inner(&conn, kind, id)
    }

    fn get_property_inner(
        conn: &Connection,
        kind: PropertyKind,
        id: usize,
    ) -> LibraryResult<Option<Property>> {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id, name FROM {} WHERE id = ?1",
            kind.table()
        ))?;
        match stmt.query_row(params![id], |row| {
            Ok(Property {
                id: row.get::<_, i64>(0)? as usize,
                name: row.get(1)?,
            })
        }) {
            Ok(property) => Ok(Some(property)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_property_by_name(
        &self,
        kind: PropertyKind,
        name: &str,
    ) -> LibraryResult<Option<Property>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id, name FROM {} WHERE name = ?1",
            kind.table()
        ))?;
        match stmt.query_row(params![name], |row| {
            Ok(Property {
                id: row.get::<_, i64>(0)? as usize,
                name: row.get(1)?,
            })
        }) {
            Ok(property) => Ok(Some(property)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn all_properties(&self, kind: PropertyKind) -> LibraryResult<Vec<Property>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT id, name FROM {} ORDER BY name",
            kind.table()
        ))?;
        let properties = stmt
            .query_map([], |row| {
                Ok(Property {
                    id: row.get::<_, i64>(0)? as usize,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(properties)
    }

    /// Rename a property, recomputing the sort name for kinds that carry one.
    pub fn rename_property(
        &self,
        kind: PropertyKind,
        id: usize,
        new_name: &str,
    ) -> LibraryResult<Property> {
        let conn = self.conn.lock().unwrap();
        let old = Self::get_property_inner(&conn, kind, id)?.ok_or_else(|| {
            LibraryError::NotFound(format!("{} ID {} does not exist", kind, id))
        })?;
        let result = if kind.has_sort_name() {
            conn.execute(
                &format!(
                    "UPDATE {} SET name = ?1, sort_name = ?2 WHERE id = ?3",
                    kind.table()
                ),
                params![new_name, sort_name(Some(new_name)), id],
            )
        } else {
            conn.execute(
                &format!("UPDATE {} SET name = ?1 WHERE id = ?2", kind.table()),
                params![new_name, id],
            )
        };
        match result {
            Ok(_) => Ok(Property {
                id,
                name: new_name.to_string(),
            }),
            Err(e) if is_unique_violation(&e) => Err(LibraryError::Duplicate(format!(
                "Renaming {} {} -> {} conflicts with existing",
                kind.label().to_lowercase(),
                old.name,
                new_name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a property row, returning its name. Fails with a constraint
    /// error while any movie still references it.
    pub fn delete_property(&self, kind: PropertyKind, id: usize) -> LibraryResult<String> {
        let conn = self.conn.lock().unwrap();
        let property = Self::get_property_inner(&conn, kind, id)?.ok_or_else(|| {
            LibraryError::NotFound(format!("{} ID {} does not exist", kind, id))
        })?;
        match conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id],
        ) {
            Ok(_) => Ok(property.name),
            Err(e) if is_foreign_key_violation(&e) => Err(LibraryError::Constraint(format!(
                "{} {} (ID {}) has movies assigned to it",
                kind, property.name, id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of every movie referencing the property, ordered by sort name.
    pub fn movies_with_property(
        &self,
        kind: PropertyKind,
        id: usize,
    ) -> LibraryResult<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let sql = match kind {
            PropertyKind::Actor => {
                "SELECT movies.id FROM movies
                 JOIN movie_actors ON movie_actors.movie_id = movies.id
                 WHERE movie_actors.actor_id = ?1 ORDER BY movies.sort_name"
            }
            PropertyKind::Category => {
                "SELECT movies.id FROM movies
                 JOIN movie_categories ON movie_categories.movie_id = movies.id
                 WHERE movie_categories.category_id = ?1 ORDER BY movies.sort_name"
            }
            PropertyKind::Series => {
                "SELECT id FROM movies WHERE series_id = ?1 ORDER BY sort_name"
            }
            PropertyKind::Studio => {
                "SELECT id FROM movies WHERE studio_id = ?1 ORDER BY sort_name"
            }
        };
        let mut stmt = conn.prepare_cached(sql)?;
        let ids = stmt
            .query_map(params![id], |row| {
                Ok(row.get::<_, i64>(0)? as usize)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // =========================================================================
    // Movies
    // =========================================================================

    pub fn insert_movie(&self, new: &NewMovie) -> LibraryResult<MovieDetails> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let insert = tx.execute(
            "INSERT INTO movies (filename, name, sort_name, series_id, series_number, studio_id, processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.filename,
                new.name,
                sort_name(new.name.as_deref()),
                new.series_id,
                new.series_number,
                new.studio_id,
                new.processed as i64,
            ],
        );
        if let Err(e) = insert {
            return if is_unique_violation(&e) {
                Err(LibraryError::Duplicate(format!(
                    "Movie {} already exists",
                    new.name.as_deref().unwrap_or(&new.filename)
                )))
            } else {
                Err(e.into())
            };
        }
        let movie_id = tx.last_insert_rowid() as usize;
        for actor_id in &new.actor_ids {
            tx.execute(
                "INSERT INTO movie_actors (movie_id, actor_id) VALUES (?1, ?2)",
                params![movie_id, actor_id],
            )?;
        }
        for category_id in &new.category_ids {
            tx.execute(
                "INSERT INTO movie_categories (movie_id, category_id) VALUES (?1, ?2)",
                params![movie_id, category_id],
            )?;
        }
        tx.commit()?;

        Self::get_movie_inner(&conn, movie_id)?.ok_or_else(|| {
            LibraryError::NotFound(format!("Movie ID {} does not exist", movie_id))
        })
    }

    pub fn get_movie(&self, id: usize) -> LibraryResult<Option<MovieDetails>> {
        let conn = self.conn.lock().unwrap();
        Self::get_movie_inner(&conn, id)
    }

    fn get_movie_inner(conn: &Connection, id: usize) -> LibraryResult<Option<MovieDetails>> {
        let mut stmt = conn.prepare_cached(
            "SELECT movies.id, movies.filename, movies.name, movies.sort_name,
                    movies.series_number, movies.processed,
                    series.id, series.name, studios.id, studios.name
             FROM movies
             LEFT OUTER JOIN series ON series.id = movies.series_id
             LEFT OUTER JOIN studios ON studios.id = movies.studio_id
             WHERE movies.id = ?1",
        )?;
        let row = stmt.query_row(params![id], |row| {
            let series = match row.get::<_, Option<i64>>(6)? {
                Some(series_id) => Some(Property {
                    id: series_id as usize,
                    name: row.get(7)?,
                }),
                None => None,
            };
            let studio = match row.get::<_, Option<i64>>(8)? {
                Some(studio_id) => Some(Property {
                    id: studio_id as usize,
                    name: row.get(9)?,
                }),
                None => None,
            };
            Ok(MovieDetails {
                id: row.get::<_, i64>(0)? as usize,
                filename: row.get(1)?,
                name: row.get(2)?,
                sort_name: row.get(3)?,
                series_number: row.get(4)?,
                processed: row.get::<_, i64>(5)? != 0,
                series,
                studio,
                actors: Vec::new(),
                categories: Vec::new(),
            })
        });
        let mut movie = match row {
            Ok(movie) => movie,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare_cached(
            "SELECT actors.id, actors.name FROM actors
             JOIN movie_actors ON movie_actors.actor_id = actors.id
             WHERE movie_actors.movie_id = ?1 ORDER BY actors.name",
        )?;
        movie.actors = stmt
            .query_map(params![id], |row| {
                Ok(Property {
                    id: row.get::<_, i64>(0)? as usize,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare_cached(
            "SELECT categories.id, categories.name FROM categories
             JOIN movie_categories ON movie_categories.category_id = categories.id
             WHERE movie_categories.movie_id = ?1 ORDER BY categories.name",
        )?;
        movie.categories = stmt
            .query_map(params![id], |row| {
                Ok(Property {
                    id: row.get::<_, i64>(0)? as usize,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(movie))
    }

    /// All movies ordered for listing: unprocessed first, then by studio,
    /// series and movie sort names.
    pub fn all_movie_files(&self) -> LibraryResult<Vec<MovieFile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT movies.id, movies.filename
             FROM movies
             LEFT OUTER JOIN studios ON studios.id = movies.studio_id
             LEFT OUTER JOIN series ON series.id = movies.series_id
             ORDER BY movies.processed, studios.sort_name, series.sort_name, movies.sort_name",
        )?;
        let movies = stmt
            .query_map([], |row| {
                Ok(MovieFile {
                    id: row.get::<_, i64>(0)? as usize,
                    filename: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(movies)
    }

    pub fn set_movie_filename(&self, id: usize, filename: &str) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE movies SET filename = ?1 WHERE id = ?2",
            params![filename, id],
        )?;
        Ok(())
    }

    pub fn set_movie_processed(&self, id: usize, processed: bool) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE movies SET processed = ?1 WHERE id = ?2",
            params![processed as i64, id],
        )?;
        Ok(())
    }

    /// Overwrite the editable movie fields and flag the movie as processed.
    /// `sort_name` is passed separately so an unchanged name keeps its
    /// existing sort name.
    pub fn update_movie_row(
        &self,
        id: usize,
        update: &MovieUpdate,
        sort_name: Option<&str>,
    ) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE movies SET name = ?1, sort_name = ?2, series_id = ?3,
                    series_number = ?4, studio_id = ?5, processed = 1
             WHERE id = ?6",
            params![
                update.name,
                sort_name,
                update.series_id,
                update.series_number,
                update.studio_id,
                id
            ],
        )?;
        Ok(())
    }

    pub fn delete_movie_row(&self, id: usize) -> LibraryResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM movie_actors WHERE movie_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM movie_categories WHERE movie_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM movies WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn attach_actor(&self, movie_id: usize, actor_id: usize) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO movie_actors (movie_id, actor_id) VALUES (?1, ?2)",
            params![movie_id, actor_id],
        )?;
        Ok(())
    }

    pub fn detach_actor(&self, movie_id: usize, actor_id: usize) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM movie_actors WHERE movie_id = ?1 AND actor_id = ?2",
            params![movie_id, actor_id],
        )?;
        Ok(())
    }

    pub fn attach_category(&self, movie_id: usize, category_id: usize) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO movie_categories (movie_id, category_id) VALUES (?1, ?2)",
            params![movie_id, category_id],
        )?;
        Ok(())
    }

    pub fn detach_category(&self, movie_id: usize, category_id: usize) -> LibraryResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM movie_categories WHERE movie_id = ?1 AND category_id = ?2",
            params![movie_id, category_id],
        )?;
        Ok(())
    }

    pub fn movie_count(&self) -> LibraryResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
