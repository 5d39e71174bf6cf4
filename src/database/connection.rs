/*!
 * Shared SQLite handle for the report corpus and translation partitions.
 *
 * Blocking rusqlite calls are moved off the async runtime with
 * `spawn_blocking`; every clone of the handle serializes on one connection.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

const DEFAULT_DB_FILENAME: &str = "reports.db";
const DEFAULT_DB_DIRNAME: &str = "report-translator";
const IN_MEMORY: &str = ":memory:";

/// Cloneable handle to one SQLite connection
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl DatabaseConnection {
    /// Open (or create) the database file, creating missing parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening report database at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Self::with_schema(conn, db_path)
    }

    /// Private in-memory database; used by tests and benches
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory report database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Self::with_schema(conn, PathBuf::from(IN_MEMORY))
    }

    fn with_schema(conn: Connection, db_path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/report-translator/reports.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY
    }

    /// Run `f` on the calling thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.connection.lock())
    }

    /// Run `f` on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || f(&shared.lock()))
            .await
            .context("Database task panicked")?
    }

    /// Run `f` inside one transaction on the blocking pool; commits only if `f` succeeds
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let mut conn = shared.lock();
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Corpus size and per-language partition sizes
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0)
        };

        self.execute(|conn| {
            let report_count: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;

            let mut stmt = conn.prepare(
                "SELECT language, COUNT(*) FROM translated_reports GROUP BY language ORDER BY language",
            )?;
            let languages = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(DatabaseStats {
                report_count,
                translated_count: languages.iter().map(|(_, count)| count).sum(),
                languages,
                file_size_bytes,
            })
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Number of source reports
    pub report_count: i64,
    /// Number of translated records across all languages
    pub translated_count: i64,
    /// Translated record count per language
    pub languages: Vec<(String, i64)>,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reports: {}, Translated: {}, Size: {} KB",
            self.report_count,
            self.translated_count,
            self.file_size_bytes / 1024
        )?;
        for (language, count) in &self.languages {
            write!(f, "\n  [{}] {}", language, count)?;
        }
        Ok(())
    }
}
