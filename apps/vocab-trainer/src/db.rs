//! Key-value persistence for vocab trainer.

use crate::models::{BatchId, Flashcard};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

const KEY_FLASHCARDS: &str = "flashcards";
const KEY_BATCH_COUNTER: &str = "batch_counter";
const KEY_LOADED_FILES: &str = "loaded_import_files";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> DbResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    // Raw key-value access

    pub fn get_raw(&self, key: &str) -> DbResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Read a JSON value. Unparsable data counts as absent.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed stored value");
                Ok(None)
            }
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }

    // Card collection

    pub fn load_cards(&self) -> DbResult<Vec<Flashcard>> {
        Ok(self.get_json(KEY_FLASHCARDS)?.unwrap_or_default())
    }

    pub fn save_cards(&self, cards: &[Flashcard]) -> DbResult<()> {
        self.set_json(KEY_FLASHCARDS, cards)
    }

    // Batch counter

    pub fn load_batch_counter(&self) -> DbResult<BatchId> {
        Ok(self.get_json(KEY_BATCH_COUNTER)?.unwrap_or(0))
    }

    pub fn save_batch_counter(&self, counter: BatchId) -> DbResult<()> {
        self.set_json(KEY_BATCH_COUNTER, &counter)
    }

    // Import directory bookkeeping

    pub fn load_loaded_files(&self) -> DbResult<Vec<String>> {
        Ok(self.get_json(KEY_LOADED_FILES)?.unwrap_or_default())
    }

    pub fn save_loaded_files(&self, files: &[String]) -> DbResult<()> {
        self.set_json(KEY_LOADED_FILES, files)
    }
}
