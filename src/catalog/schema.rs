//! SQLite schema for the movie catalog database.
//!
//! Movies keep a unique filename plus a derived sort name used for listing
//! order. Actors and categories attach through junction tables with composite
//! primary keys, series and studios through nullable foreign keys on the
//! movies table.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const ACTORS_TABLE: Table = Table {
    name: "actors",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    primary_key: &[],
    unique_constraints: &[],
};

const CATEGORIES_TABLE: Table = Table {
    name: "categories",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    primary_key: &[],
    unique_constraints: &[],
};

const SERIES_TABLE: Table = Table {
    name: "series",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("sort_name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    primary_key: &[],
    unique_constraints: &[],
};

const STUDIOS_TABLE: Table = Table {
    name: "studios",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("sort_name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    primary_key: &[],
    unique_constraints: &[],
};

const SERIES_FK: ForeignKey = ForeignKey {
    foreign_table: "series",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const STUDIOS_FK: ForeignKey = ForeignKey {
    foreign_table: "studios",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const MOVIES_TABLE: Table = Table {
    name: "movies",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("filename", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text),
        sqlite_column!("sort_name", &SqlType::Text),
        sqlite_column!("series_id", &SqlType::Integer, foreign_key = Some(&SERIES_FK)),
        sqlite_column!("series_number", &SqlType::Integer),
        sqlite_column!("studio_id", &SqlType::Integer, foreign_key = Some(&STUDIOS_FK)),
        sqlite_column!("processed", &SqlType::Integer, non_null = true),
    ],
    primary_key: &[],
    unique_constraints: &[],
};

const MOVIES_FK: ForeignKey = ForeignKey {
    foreign_table: "movies",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const ACTORS_JUNCTION_FK: ForeignKey = ForeignKey {
    foreign_table: "actors",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const MOVIE_ACTORS_TABLE: Table = Table {
    name: "movie_actors",
    columns: &[
        sqlite_column!("movie_id", &SqlType::Integer, foreign_key = Some(&MOVIES_FK)),
        sqlite_column!("actor_id", &SqlType::Integer, foreign_key = Some(&ACTORS_JUNCTION_FK)),
    ],
    primary_key: &["movie_id", "actor_id"],
    unique_constraints: &[],
};

const CATEGORIES_JUNCTION_FK: ForeignKey = ForeignKey {
    foreign_table: "categories",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const MOVIE_CATEGORIES_TABLE: Table = Table {
    name: "movie_categories",
    columns: &[
        sqlite_column!("movie_id", &SqlType::Integer, foreign_key = Some(&MOVIES_FK)),
        sqlite_column!(
            "category_id",
            &SqlType::Integer,
            foreign_key = Some(&CATEGORIES_JUNCTION_FK)
        ),
    ],
    primary_key: &["movie_id", "category_id"],
    unique_constraints: &[],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        ACTORS_TABLE,
        CATEGORIES_TABLE,
        SERIES_TABLE,
        STUDIOS_TABLE,
        MOVIES_TABLE,
        MOVIE_ACTORS_TABLE,
        MOVIE_CATEGORIES_TABLE,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_and_validates() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = &CATALOG_VERSIONED_SCHEMAS[0];
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn test_movie_filename_unique() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        conn.execute(
            "INSERT INTO movies (filename, name, sort_name, processed) VALUES ('a.mp4', 'A', 'a', 0)",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO movies (filename, name, sort_name, processed) VALUES ('a.mp4', 'B', 'b', 0)",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_junction_rejects_duplicate_pair() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        conn.execute("INSERT INTO actors (name) VALUES ('Al Pacino')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO movies (filename, name, sort_name, processed) VALUES ('a.mp4', 'A', 'a', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movie_actors (movie_id, actor_id) VALUES (1, 1)",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO movie_actors (movie_id, actor_id) VALUES (1, 1)",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_series_delete_blocked_while_referenced() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        conn.execute(
            "INSERT INTO series (name, sort_name) VALUES ('Trilogy', 'trilogy')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO movies (filename, name, sort_name, series_id, processed) VALUES ('a.mp4', 'A', 'a', 1, 0)",
            [],
        )
        .unwrap();

        let blocked = conn.execute("DELETE FROM series WHERE id = 1", []);
        assert!(blocked.is_err());

        conn.execute("DELETE FROM movies WHERE id = 1", []).unwrap();
        conn.execute("DELETE FROM series WHERE id = 1", []).unwrap();
    }
}
