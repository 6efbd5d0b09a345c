//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Statement, User};
use crate::migrations::MIGRATIONS;
use crate::ports::{StatementsRepository, UsersRepository};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const STATEMENT_COLUMNS: &str =
    "id, user_id, operation_type, amount::VARCHAR, description, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Error::database(e.to_string())
    }
}

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

fn is_unique_violation(err: &duckdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("duplicate key") || msg.contains("unique constraint")
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Retries with exponential backoff on file locking errors, which happen
    /// when another tally process holds the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if !is_retryable_error(&err_msg) || attempt + 1 >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    tracing::warn!(
                        delay_ms = delay.as_millis() as u64,
                        attempt = attempt + 1,
                        max = MAX_RETRIES,
                        "Database busy, retrying: {}",
                        err_msg
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading is disabled; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::database("connection lock poisoned"))
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run any pending migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS)
            .run_pending()
            .map_err(|e| Error::database(format!("{:#}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === User operations ===

    pub fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                format_timestamp(&user.created_at),
                format_timestamp(&user.updated_at),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::UserAlreadyExists
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.find_user(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS), id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS), email)
    }

    fn find_user(&self, sql: &str, key: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query_map([key], read_row::<6>)?;
        rows.next().transpose()?.map(row_to_user).transpose()
    }

    pub fn get_user_count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Statement operations ===

    pub fn insert_statement(&self, statement: &Statement) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO statements (id, user_id, operation_type, amount, description, created_at, updated_at)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), ?, ?, ?)",
            params![
                statement.id.to_string(),
                statement.user_id.to_string(),
                statement.operation_type.as_str(),
                statement.amount.to_string(),
                statement.description,
                format_timestamp(&statement.created_at),
                format_timestamp(&statement.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn find_statement(&self, user_id: &str, statement_id: &str) -> Result<Option<Statement>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM statements WHERE id = ? AND user_id = ?",
            STATEMENT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![statement_id, user_id], read_row::<7>)?;
        rows.next().transpose()?.map(row_to_statement).transpose()
    }

    pub fn find_statements_by_user(&self, user_id: &str) -> Result<Vec<Statement>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM statements WHERE user_id = ? ORDER BY seq",
            STATEMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([user_id], read_row::<7>)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(row_to_statement).collect()
    }

    pub fn get_statement_count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM statements", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl UsersRepository for DuckDbRepository {
    async fn add_user(&self, user: &User) -> Result<()> {
        self.insert_user(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.find_user_by_id(&id.to_string())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user_by_email(email)
    }
}

#[async_trait]
impl StatementsRepository for DuckDbRepository {
    async fn add_statement(&self, statement: &Statement) -> Result<()> {
        self.insert_statement(statement)
    }

    async fn get_statement(&self, user_id: Uuid, statement_id: Uuid) -> Result<Option<Statement>> {
        self.find_statement(&user_id.to_string(), &statement_id.to_string())
    }

    async fn get_statements_by_user(&self, user_id: Uuid) -> Result<Vec<Statement>> {
        self.find_statements_by_user(&user_id.to_string())
    }
}

// Helper functions

/// Read the first N columns of a row as strings
///
/// Every column we select is VARCHAR (amounts are cast), so rows are read as
/// plain strings and parsed into domain types afterwards.
fn read_row<const N: usize>(row: &duckdb::Row) -> duckdb::Result<[String; N]> {
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (idx, value) in values.iter_mut().enumerate() {
        *value = row.get(idx)?;
    }
    Ok(values)
}

fn row_to_user(row: [String; 6]) -> Result<User> {
    let [id, name, email, password_hash, created_at, updated_at] = row;
    Ok(User {
        id: parse_uuid(&id)?,
        name,
        email,
        password_hash,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_statement(row: [String; 7]) -> Result<Statement> {
    let [id, user_id, operation_type, amount, description, created_at, updated_at] = row;
    Ok(Statement {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        operation_type: operation_type.parse()?,
        amount: Decimal::from_str_exact(&amount)
            .map_err(|e| Error::database(format!("invalid stored amount '{}': {}", amount, e)))?
            .normalize(),
        description,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::database(format!("invalid stored id '{}': {}", s, e)))
}

/// Fixed-width RFC 3339 so stored timestamps also sort as text
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("invalid stored timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Database is locked"));
        assert!(is_retryable_error(
            "The process cannot access the file because it is being used by another process"
        ));
        assert!(!is_retryable_error("Catalog Error: Table with name users does not exist"));
    }

    #[test]
    fn test_timestamp_round_trip_keeps_microseconds() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(&now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = DateTime::parse_from_rfc3339("2024-01-15T10:00:00.5Z").unwrap().with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2024-01-15T10:00:01Z").unwrap().with_timezone(&Utc);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_unique_email_maps_to_user_already_exists() {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();

        let first = User::new("A", "dup@email.com", "hash").unwrap();
        let second = User::new("B", "dup@email.com", "hash").unwrap();
        repo.insert_user(&first).unwrap();

        let err = repo.insert_user(&second).unwrap_err();
        assert!(matches!(err, Error::UserAlreadyExists));
        assert_eq!(repo.get_user_count().unwrap(), 1);
    }

    #[test]
    fn test_stored_amount_keeps_cents() {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();

        let user = User::new("A", "a@email.com", "hash").unwrap();
        repo.insert_user(&user).unwrap();
        let statement = Statement::new(
            user.id,
            crate::domain::OperationType::Deposit,
            Decimal::new(12345, 2),
            "cents",
        )
        .unwrap();
        repo.insert_statement(&statement).unwrap();

        let stored = repo
            .find_statement(&user.id.to_string(), &statement.id.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, Decimal::new(12345, 2));
        assert_eq!(stored.operation_type, crate::domain::OperationType::Deposit);
    }
}
