use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::application::ports::SubmissionStorePort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::record::NewSubmission;

/// Almacén de envíos sobre SQLite.
///
/// Cada operación abre y cierra su propia conexión; la serialización de
/// escrituras concurrentes queda en manos del propio SQLite.
pub struct SqliteSubmissionStore {
    path: PathBuf,
}

impl SqliteSubmissionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }

    /// Reinicio destructivo del esquema, ejecutado en cada arranque del
    /// proceso: la tabla de envíos se elimina y se recrea vacía, con lo que
    /// todo envío anterior se descarta.
    pub fn reset_schema(&self) -> Result<()> {
        warn!("Reiniciando el esquema de envíos: se descartan todas las filas anteriores");
        let conn = self.connect()?;
        conn.execute_batch(
            "DROP TABLE IF EXISTS submissions;
             CREATE TABLE submissions (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 aadhar_number TEXT NOT NULL,
                 name TEXT NOT NULL,
                 gender TEXT NOT NULL,
                 dob TEXT NOT NULL
             );",
        )?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStorePort for SqliteSubmissionStore {
    async fn insert(&self, submission: NewSubmission) -> DomainResult<i64> {
        let conn = self.connect().map_err(|e| {
            DomainError::Persistence(format!("no se pudo abrir la base de datos: {e}"))
        })?;

        conn.execute(
            "INSERT INTO submissions (aadhar_number, name, gender, dob) VALUES (?1, ?2, ?3, ?4)",
            params![
                submission.aadhar_number,
                submission.name,
                submission.gender,
                submission.dob
            ],
        )
        .map_err(|e| DomainError::Persistence(format!("inserción fallida: {e}")))?;

        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn submission(aadhar: &str) -> NewSubmission {
        NewSubmission {
            aadhar_number: aadhar.to_string(),
            name: "A".to_string(),
            gender: "M".to_string(),
            dob: "2000-01-01".to_string(),
        }
    }

    fn row_count(store: &SqliteSubmissionStore) -> i64 {
        let conn = store.connect().unwrap();
        conn.query_row("SELECT COUNT(*) FROM submissions", [], |r| r.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_appends_row_verbatim() {
        let dir = tempdir().unwrap();
        let store = SqliteSubmissionStore::new(dir.path().join("test.db"));
        store.reset_schema().unwrap();

        let id = store.insert(submission("1234")).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(row_count(&store), 1);

        let conn = store.connect().unwrap();
        let (aadhar, name, gender, dob): (String, String, String, String) = conn
            .query_row(
                "SELECT aadhar_number, name, gender, dob FROM submissions WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(
            (aadhar.as_str(), name.as_str(), gender.as_str(), dob.as_str()),
            ("1234", "A", "M", "2000-01-01")
        );
    }

    #[tokio::test]
    async fn test_duplicate_aadhar_numbers_are_accepted() {
        let dir = tempdir().unwrap();
        let store = SqliteSubmissionStore::new(dir.path().join("test.db"));
        store.reset_schema().unwrap();

        assert_eq!(store.insert(submission("1234")).await.unwrap(), 1);
        assert_eq!(store.insert(submission("1234")).await.unwrap(), 2);
        assert_eq!(row_count(&store), 2);
    }

    #[tokio::test]
    async fn test_reset_schema_discards_prior_rows() {
        let dir = tempdir().unwrap();
        let store = SqliteSubmissionStore::new(dir.path().join("test.db"));
        store.reset_schema().unwrap();

        store.insert(submission("1234")).await.unwrap();
        store.insert(submission("5678")).await.unwrap();
        assert_eq!(row_count(&store), 2);

        // Un nuevo arranque del proceso repite el reinicio y vacía la tabla.
        store.reset_schema().unwrap();
        assert_eq!(row_count(&store), 0);
    }

    #[tokio::test]
    async fn test_insert_without_schema_is_persistence_error() {
        let dir = tempdir().unwrap();
        let store = SqliteSubmissionStore::new(dir.path().join("test.db"));

        let err = store.insert(submission("1234")).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
    }
}
