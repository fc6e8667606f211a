//! Opening the chat database.
//!
//! History and outbox reads go through a small read-only pool. Every write
//! (sends, queueing, replay commits, outbox claims) goes through one writer
//! connection, so SQLite never sees two writers from the same process.
//! Other `chatbot` processes open their own pools on the same file; WAL plus
//! the busy timeout lets them take turns.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// File name of the chat database inside the data directory.
pub const DATABASE_FILE: &str = "chatbot.db";

const READER_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reader and writer pools over one SQLite file.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open `chatbot.db` in `data_dir`, creating and migrating it as needed.
    pub async fn open(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::open_file(&database_path(data_dir)).await
    }

    /// Open the database at an explicit file path.
    ///
    /// Migrations run on the writer before any reader connects, since a
    /// read-only connection cannot create the file or its tables.
    pub async fn open_file(path: &Path) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone().create_if_missing(true))
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        debug!(path = %path.display(), "Chat database open");
        Ok(Self { reader, writer })
    }

    /// Close both pools, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}

/// Location of the chat database inside the data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path() {
        assert_eq!(
            database_path(Path::new("/tmp/chatbot-data")),
            PathBuf::from("/tmp/chatbot-data/chatbot.db")
        );
    }

    #[tokio::test]
    async fn test_open_creates_missing_file_with_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        assert!(database_path(dir.path()).exists());

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        assert_eq!(foreign_keys, 1);
    }

    #[tokio::test]
    async fn test_reader_cannot_write() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();

        let result = sqlx::query("INSERT INTO settings (key, value) VALUES ('k', 'v')")
            .execute(&pool.reader)
            .await;
        assert!(result.is_err());
    }
}
