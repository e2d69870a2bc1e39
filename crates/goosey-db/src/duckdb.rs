//! DuckDB ledger store implementation

use crate::error::{DbError, DbResult};
use crate::traits::LedgerStore;
use chrono::DateTime;
use duckdb::Connection;
use goosey_core::{LedgerConfig, LedgerRow, MigrationId};
use std::path::Path;

/// DuckDB-backed ledger.
///
/// Single-threaded: the engine applies migrations strictly one at a time, so
/// the connection is owned directly rather than behind a `Mutex`.
pub struct DuckDbLedger {
    conn: Connection,
    schema: String,
    table: String,
}

impl DuckDbLedger {
    /// Open an in-memory database with the ledger table created
    pub fn in_memory(ledger: &LedgerConfig) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::with_connection(conn, ledger)
    }

    /// Open (or create) a database file with the ledger table created
    pub fn from_path(path: &Path, ledger: &LedgerConfig) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::with_connection(conn, ledger)
    }

    /// Open from a path string (handles the `:memory:` special case)
    pub fn new(path: &str, ledger: &LedgerConfig) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory(ledger)
        } else {
            Self::from_path(Path::new(path), ledger)
        }
    }

    fn with_connection(conn: Connection, ledger: &LedgerConfig) -> DbResult<Self> {
        ledger
            .validate()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let store = Self {
            conn,
            schema: ledger.schema.clone(),
            table: ledger.qualified_table(),
        };
        store.ensure_ledger()?;
        Ok(store)
    }

    /// Borrow the underlying DuckDB connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fully-qualified ledger table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn contains(&self, id: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ?", self.table),
            duckdb::params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Split `sql` into statements on `;` outside quoted literals and comments.
///
/// Comments are replaced by a single space; literals are kept verbatim.
/// Block comments may nest.
fn statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                current.push(c);
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
                current.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut depth = 1;
                while depth > 0 {
                    match chars.next() {
                        Some('*') if chars.peek() == Some(&'/') => {
                            chars.next();
                            depth -= 1;
                        }
                        Some('/') if chars.peek() == Some(&'*') => {
                            chars.next();
                            depth += 1;
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
                current.push(' ');
            }
            ';' => statements.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    statements.push(current);
    statements
}

/// Whether `sql` holds nothing but whitespace, comments and empty statements.
fn is_blank_script(sql: &str) -> bool {
    statements(sql).iter().all(|s| s.trim().is_empty())
}

/// First top-level statement in `sql` that opens or ends a transaction.
fn transaction_control(sql: &str) -> Option<&'static str> {
    const KEYWORDS: [&str; 6] = ["BEGIN", "START", "COMMIT", "ROLLBACK", "END", "ABORT"];

    statements(sql).iter().find_map(|statement| {
        let keyword = statement.split_whitespace().next()?;
        KEYWORDS
            .iter()
            .copied()
            .find(|k| keyword.eq_ignore_ascii_case(k))
    })
}

impl LedgerStore for DuckDbLedger {
    fn ensure_ledger(&self) -> DbResult<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE SCHEMA IF NOT EXISTS {schema};
                 CREATE TABLE IF NOT EXISTS {table} (
                     id         VARCHAR PRIMARY KEY,
                     batch      BIGINT NOT NULL,
                     marker     BOOLEAN NOT NULL DEFAULT false,
                     merged_at  BIGINT NOT NULL,
                     author     VARCHAR,
                     checksum   VARCHAR,
                     applied_at TIMESTAMP NOT NULL DEFAULT now()
                 );",
                schema = self.schema,
                table = self.table,
            ))
            .map_err(|e| DbError::ExecutionError(format!("failed to create ledger table: {e}")))
    }

    fn run_script(&self, sql: &str) -> DbResult<()> {
        if is_blank_script(sql) {
            log::debug!("Script has no statements, nothing to execute");
            return Ok(());
        }

        if let Some(statement) = transaction_control(sql) {
            return Err(DbError::TransactionControl(statement.to_string()));
        }

        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    fn rollback_script(&self) -> DbResult<()> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }

    fn insert_migration(&self, row: &LedgerRow) -> DbResult<()> {
        if self.contains(&row.id)? {
            return Err(DbError::DuplicateIdentifier(row.id.to_string()));
        }

        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, batch, marker, merged_at, author, checksum) VALUES (?, ?, ?, ?, ?, ?)",
                self.table
            ),
            duckdb::params![
                row.id.as_str(),
                row.batch,
                row.marker,
                row.merged_at.timestamp_micros(),
                row.author,
                row.checksum
            ],
        )?;
        Ok(())
    }

    fn delete_migration(&self, id: &str) -> DbResult<()> {
        let deleted = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?", self.table),
            duckdb::params![id],
        )?;
        if deleted == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn set_marker(&self, batch: i64, id: &str) -> DbResult<()> {
        let present: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE id = ? AND batch = ?", self.table),
            duckdb::params![id, batch],
            |row| row.get(0),
        )?;
        if present == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }

        self.conn.execute(
            &format!("UPDATE {} SET marker = (id = ?) WHERE batch = ?", self.table),
            duckdb::params![id, batch],
        )?;
        Ok(())
    }

    fn rows(&self) -> DbResult<Vec<LedgerRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, batch, marker, merged_at, author, checksum FROM {} ORDER BY merged_at, id",
            self.table
        ))?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, bool>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, batch, marker, merged_us, author, checksum)| {
                let merged_at = DateTime::from_timestamp_micros(merged_us).ok_or_else(|| {
                    DbError::InvalidRow(format!("{id}: merged_at {merged_us} is out of range"))
                })?;
                let id = MigrationId::try_new(id)
                    .ok_or_else(|| DbError::InvalidRow("empty migration id".to_string()))?;
                Ok(LedgerRow {
                    id,
                    batch,
                    marker,
                    merged_at,
                    author,
                    checksum,
                })
            })
            .collect()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
