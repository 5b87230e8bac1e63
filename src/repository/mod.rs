mod embedded;

use embedded::migrations;

use rusqlite::{Connection, OptionalExtension, Row, params};

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    error::{StorageError, StorageResult},
    models::Note,
};

const NOTE_COLUMNS: &str = "id, title, content, reminderDate";

/// Single-connection store for the `notes` table.
///
/// Statements run on the blocking pool and are serialized by the connection
/// lock, so every operation touches the database alone.
#[derive(Clone)]
pub struct Repository {
    conn: Arc<Mutex<Connection>>,
}

impl Repository {
    /// Opens (or creates) the database file, creating missing parent directories.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        tracing::info!("Opened notes database at {}", path.display());

        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub async fn migrate(&self) -> StorageResult<()> {
        self.with_conn(|conn| {
            let migrations_report = migrations::runner().run(conn)?;

            for migration in migrations_report.applied_migrations() {
                tracing::info!(
                    "Migration Applied -  Name: {}, Version: {}",
                    migration.name(),
                    migration.version()
                );
            }

            tracing::info!("DB migrations finished!");

            Ok(())
        })
        .await
    }

    pub async fn create_note(
        &self,
        title: String,
        content: String,
        reminder_date: Option<String>,
    ) -> StorageResult<i64> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO notes (title, content, reminderDate) VALUES (?1, ?2, ?3)",
                params![title, content, reminder_date],
            )?;

            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Replaces all mutable fields. Returns `false` when no note has this id.
    pub async fn update_note(
        &self,
        id: i64,
        title: String,
        content: String,
        reminder_date: Option<String>,
    ) -> StorageResult<bool> {
        self.with_conn(move |conn| {
            let rows = conn.execute(
                "UPDATE notes SET title = ?1, content = ?2, reminderDate = ?3 WHERE id = ?4",
                params![title, content, reminder_date, id],
            )?;

            Ok(rows == 1)
        })
        .await
    }

    pub async fn delete_note(&self, id: i64) -> StorageResult<bool> {
        self.with_conn(move |conn| {
            let rows = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;

            Ok(rows == 1)
        })
        .await
    }

    pub async fn get_one_note(&self, id: i64) -> StorageResult<Option<Note>> {
        self.with_conn(move |conn| {
            let note = conn
                .query_row(
                    &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
                    params![id],
                    note_from_row,
                )
                .optional()?;

            Ok(note)
        })
        .await
    }

    pub async fn get_all_notes(&self) -> StorageResult<Vec<Note>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id"))?;
            let notes = stmt
                .query_map([], note_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(notes)
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StorageError::Poisoned)?;
            f(&mut *guard)
        })
        .await?
    }
}

// Columns are nullable in databases created by older builds.
fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
        reminder_date: row.get("reminderDate")?,
    })
}
