//! SQLite cache.
//!
//! One table per logical table:
//!
//! ```text
//! <table> (id INTEGER PRIMARY KEY, record_id, character, russian, english,
//!          character_limit, version, narrative_comment)
//! ```
//!
//! Every operation opens its own connection; writes run in a single
//! transaction and roll back on error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use locsync_core::{CacheError, CacheStore, Field, FieldDiff, LogicalTable, Record, RecordId};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const COLUMNS: &str = r#""record_id", "character", "russian", "english", "character_limit", "version", "narrative_comment""#;

/// Cache for one logical table in a SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    path: PathBuf,
    table: LogicalTable,
}

impl SqliteCache {
    /// Open the database at `path`, creating the file and table if needed.
    pub fn open(path: impl AsRef<Path>, table: LogicalTable) -> Result<Self, CacheError> {
        let cache = Self {
            path: path.as_ref().to_path_buf(),
            table,
        };
        cache
            .connect()
            .and_then(|conn| conn.execute_batch(&schema_sql(table)))
            .map_err(|e| cache.backend(e))?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn backend(&self, err: rusqlite::Error) -> CacheError {
        CacheError::Backend {
            table: self.table,
            source: Box::new(err),
        }
    }

    fn name(&self) -> &'static str {
        self.table.cache_table()
    }
}

fn schema_sql(table: LogicalTable) -> String {
    let name = table.cache_table();
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{name}" (
    id INTEGER PRIMARY KEY,
    "record_id" TEXT NOT NULL,
    "character" TEXT NOT NULL DEFAULT '',
    "russian" TEXT NOT NULL DEFAULT '',
    "english" TEXT NOT NULL DEFAULT '',
    "character_limit" TEXT NOT NULL DEFAULT '',
    "version" TEXT NOT NULL DEFAULT '',
    "narrative_comment" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS "idx_{name}_record_id" ON "{name}" ("record_id");"#
    )
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        record_id: RecordId(row.get(0)?),
        character: row.get(1)?,
        russian: row.get(2)?,
        english: row.get(3)?,
        character_limit: row.get(4)?,
        version: row.get(5)?,
        narrative_comment: row.get(6)?,
    })
}

impl CacheStore for SqliteCache {
    fn table(&self) -> LogicalTable {
        self.table
    }

    fn get_all(&self) -> Result<Vec<Record>, CacheError> {
        let sql = format!(r#"SELECT {COLUMNS} FROM "{}" ORDER BY id"#, self.name());
        let read = || -> rusqlite::Result<Vec<Record>> {
            let conn = self.connect()?;
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        };
        let records = read().map_err(|e| self.backend(e))?;
        if records.is_empty() {
            tracing::debug!("{}: cache table is empty", self.table);
        }
        Ok(records)
    }

    fn get_by_id(&self, id: &RecordId) -> Result<Option<Record>, CacheError> {
        let sql = format!(
            r#"SELECT {COLUMNS} FROM "{}" WHERE "record_id" = ?1 ORDER BY id LIMIT 1"#,
            self.name()
        );
        let read = || -> rusqlite::Result<Option<Record>> {
            let conn = self.connect()?;
            conn.query_row(&sql, params![id.as_str()], row_to_record)
                .optional()
        };
        read().map_err(|e| self.backend(e))
    }

    fn insert_many(&self, records: &[Record]) -> Result<(), CacheError> {
        let sql = format!(
            r#"INSERT INTO "{}" ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            self.name()
        );
        let write = || -> rusqlite::Result<()> {
            let mut conn = self.connect()?;
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&sql)?;
                for r in records {
                    stmt.execute(params![
                        r.record_id.as_str(),
                        r.character,
                        r.russian,
                        r.english,
                        r.character_limit,
                        r.version,
                        r.narrative_comment,
                    ])?;
                }
            }
            tx.commit()
        };
        write().map_err(|e| self.backend(e))?;

        let ids: Vec<&str> = records.iter().map(|r| r.record_id.as_str()).collect();
        tracing::info!(
            "records {ids:?} added to table '{}' of the cache",
            self.name()
        );
        Ok(())
    }

    fn update_partial(&self, id: &RecordId, fields: &FieldDiff) -> Result<(), CacheError> {
        if fields.is_empty() {
            return Ok(());
        }

        let assignments: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(i, field)| format!(r#""{}" = ?{}"#, field.name(), i + 1))
            .collect();
        // Same row as `get_by_id` when an id appears more than once.
        let sql = format!(
            r#"UPDATE "{name}" SET {} WHERE id = (SELECT id FROM "{name}" WHERE "record_id" = ?{} ORDER BY id LIMIT 1)"#,
            assignments.join(", "),
            fields.len() + 1,
            name = self.name(),
        );
        let mut values: Vec<&str> = fields.values().map(String::as_str).collect();
        values.push(id.as_str());

        let write = || -> rusqlite::Result<usize> {
            let mut conn = self.connect()?;
            let tx = conn.transaction()?;
            let changed = tx.execute(&sql, params_from_iter(values.iter()))?;
            if changed > 0 {
                tx.commit()?;
            }
            Ok(changed)
        };
        let changed = write().map_err(|e| self.backend(e))?;
        if changed == 0 {
            return Err(CacheError::NoMatch {
                table: self.table,
                id: id.clone(),
            });
        }

        let names: Vec<&str> = fields.keys().map(|f| Field::name(*f)).collect();
        tracing::info!(
            "record '{id}' updated in table '{}' of the cache ({})",
            self.name(),
            names.join(", ")
        );
        Ok(())
    }
}
