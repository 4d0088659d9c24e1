// src/store/sqlite.rs

//! Relational sink.
//!
//! Nine typed tables, one per post type, sharing the fixed prefix columns
//! `(post_id, date, notes, tags, is_reblog)` and ending with the two
//! type-specific payload columns. A read-only `all_posts` view exposes the
//! union of all tables with a literal type tag and generic payload names.
//!
//! Writes run inside one deferred transaction; nothing lands on disk until
//! `commit()` at normal termination.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::{AppError, Result};
use crate::models::{PostRecord, PostType};

/// SQLite sink holding one open connection and one open transaction.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Create a fresh database at `path`, build the schema, and open the
    /// run-wide transaction.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::store(format!("can't create DB {:?}: {e}", path)))?;

        conn.execute_batch(&schema_sql())?;
        conn.execute_batch("BEGIN")?;

        Ok(Self { conn })
    }

    /// Insert one row into the table matching the record's type.
    pub fn insert(&self, record: &PostRecord) -> Result<()> {
        let post_type = record.post_type();
        let (field_a, field_b) = post_type.payload_columns();
        // Table and column names come from the PostType enum, never from
        // input data.
        let sql = format!(
            "INSERT INTO {} (post_id, date, notes, tags, is_reblog, {field_a}, {field_b}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            post_type.table()
        );

        let (data_1, data_2) = record.kind.payload();
        self.conn.execute(
            &sql,
            params![
                record.id,
                record.date,
                record.notes,
                record.tags_joined(),
                record.is_reblog,
                data_1,
                data_2,
            ],
        )?;
        Ok(())
    }

    /// Commit the run-wide transaction and close the connection.
    pub fn commit(self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.conn.close().map_err(|(_, e)| AppError::Sqlite(e))
    }
}

/// Schema text: nine typed tables plus the union view, derived from the
/// `PostType` enum so table and column names have one source of truth.
fn schema_sql() -> String {
    let mut sql = String::new();

    for post_type in PostType::ALL {
        let (field_a, field_b) = post_type.payload_columns();
        sql.push_str(&format!(
            "CREATE TABLE {}(post_id INT, date TEXT, notes INT, tags TEXT, \
             is_reblog INT, {field_a} TEXT, {field_b} TEXT);\n",
            post_type.table()
        ));
    }

    let selects: Vec<String> = PostType::ALL
        .iter()
        .map(|post_type| {
            let (field_a, field_b) = post_type.payload_columns();
            format!(
                "SELECT '{}', post_id, date, notes, tags, is_reblog, {field_a}, {field_b} FROM {}",
                post_type.as_str(),
                post_type.table()
            )
        })
        .collect();

    sql.push_str(&format!(
        "CREATE VIEW all_posts(type, post_id, date, notes, tags, is_reblog, data1, data2) AS\n{};\n",
        selects.join("\nUNION ALL ")
    ));

    sql
}
