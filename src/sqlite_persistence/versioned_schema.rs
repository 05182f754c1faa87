//! Declarative SQLite schema with versioning.
//!
//! Tables are described as data; a [`VersionedSchema`] can create them on a
//! fresh database (stamping `PRAGMA user_version`) or validate that an
//! existing database still matches the description.

use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

/// Offset added to the schema version in `PRAGMA user_version`, so that a
/// database created by unrelated software is never mistaken for ours.
pub const BASE_DB_VERSION: usize = 77000;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // unused_mut fires when no optional field assignment is passed
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }

    fn from_sql(sql: &str) -> Option<&'static SqlType> {
        match sql {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            "BLOB" => Some(&SqlType::Blob),
            _ => None,
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::SetDefault => "SET DEFAULT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    /// Table-level composite primary key. Leave empty when a single column
    /// carries `is_primary_key` instead.
    pub primary_key: &'static [&'static str],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if column.is_unique {
                create_sql.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                create_sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.as_sql(),
                ));
            }
        }
        if !self.primary_key.is_empty() {
            create_sql.push_str(&format!(", PRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;
        Ok(())
    }

    fn is_primary_key_member(&self, column: &Column<'static, &'static str>) -> bool {
        column.is_primary_key || self.primary_key.contains(&column.name)
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            self.validate_columns(conn, table)?;
            self.validate_unique_constraints(conn, table)?;
            self.validate_foreign_keys(conn, table)?;
        }
        Ok(())
    }

    fn validate_columns(&self, conn: &Connection, table: &Table) -> Result<()> {
        struct ActualColumn {
            name: String,
            sql_type: &'static SqlType,
            non_null: bool,
            default_value: Option<String>,
            is_primary_key: bool,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
        let actual_columns = stmt
            .query_map(params![], |row| {
                let type_name = row.get::<usize, String>(2)?;
                let sql_type = SqlType::from_sql(&type_name).ok_or(
                    rusqlite::Error::InvalidColumnType(2, type_name, Type::Text),
                )?;
                Ok(ActualColumn {
                    name: row.get(1)?,
                    sql_type,
                    non_null: row.get::<usize, i32>(3)? == 1,
                    default_value: row.get(4)?,
                    // pk is the 1-based position within the primary key
                    is_primary_key: row.get::<usize, i32>(5)? > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if actual_columns.len() != table.columns.len() {
            bail!(
                "Table {} has columns ({}), expected ({})",
                table.name,
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                table
                    .columns
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(table.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    actual.name
                );
            }
            if actual.sql_type != expected.sql_type {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {:?}",
                    table.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    table.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            // Stored defaults may come back wrapped in parentheses
            let actual_default = actual.default_value.as_deref().map(strip_parentheses);
            if actual_default != expected.default_value.map(strip_parentheses) {
                bail!(
                    "Table {} column {} default mismatch: expected {:?}, got {:?}",
                    table.name,
                    expected.name,
                    expected.default_value,
                    actual.default_value
                );
            }
            if actual.is_primary_key != table.is_primary_key_member(expected) {
                bail!(
                    "Table {} column {} primary key mismatch",
                    table.name,
                    expected.name
                );
            }
        }
        Ok(())
    }

    fn validate_unique_constraints(&self, conn: &Connection, table: &Table) -> Result<()> {
        if table.unique_constraints.is_empty() {
            return Ok(());
        }

        // SQLite exposes unique constraints as unique indices
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table.name))?;
        let unique_indices: Vec<String> = stmt
            .query_map([], |row| {
                Ok((row.get::<usize, String>(1)?, row.get::<usize, i32>(2)?))
            })?
            .filter_map(|r| r.ok())
            .filter(|(_, is_unique)| *is_unique == 1)
            .map(|(name, _)| name)
            .collect();

        let mut unique_index_columns: Vec<Vec<String>> = Vec::new();
        for index_name in &unique_indices {
            let mut index_stmt = conn.prepare(&format!("PRAGMA index_info({})", index_name))?;
            let mut columns: Vec<String> = index_stmt
                .query_map([], |row| row.get::<usize, String>(2))?
                .filter_map(|r| r.ok())
                .collect();
            columns.sort();
            unique_index_columns.push(columns);
        }

        for expected_columns in table.unique_constraints {
            let mut expected_sorted: Vec<&str> = expected_columns.to_vec();
            expected_sorted.sort();
            let found = unique_index_columns
                .iter()
                .any(|actual| actual.iter().map(String::as_str).collect::<Vec<_>>() == expected_sorted);
            if !found {
                bail!(
                    "Table {} is missing unique constraint on columns ({})",
                    table.name,
                    expected_columns.join(", ")
                );
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, conn: &Connection, table: &Table) -> Result<()> {
        struct ActualFk {
            from_column: String,
            to_table: String,
            to_column: String,
            on_delete: String,
        }

        // foreign_key_list columns: id, seq, table, from, to, on_update, on_delete, match
        let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table.name))?;
        let actual_fks: Vec<ActualFk> = stmt
            .query_map([], |row| {
                Ok(ActualFk {
                    from_column: row.get(3)?,
                    to_table: row.get(2)?,
                    to_column: row.get(4)?,
                    on_delete: row.get(6)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        for column in table.columns {
            let Some(expected) = column.foreign_key else {
                continue;
            };
            let found = actual_fks.iter().any(|actual| {
                actual.from_column == column.name
                    && actual.to_table == expected.foreign_table
                    && actual.to_column == expected.foreign_column
                    && actual.on_delete == expected.on_delete.as_sql()
            });
            if !found {
                bail!(
                    "Table {} column {} is missing foreign key REFERENCES {}({}) ON DELETE {}",
                    table.name,
                    column.name,
                    expected.foreign_table,
                    expected.foreign_column,
                    expected.on_delete.as_sql()
                );
            }
        }
        Ok(())
    }
}

fn strip_parentheses(s: &str) -> String {
    if s.starts_with('(') && s.ends_with(')') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
