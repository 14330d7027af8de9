//! Schema migrations for the SQLite cache backend.
//!
//! Applied versions are recorded in `_migrations`; each pending migration
//! runs inside its own transaction together with its version row.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// (version, description, SQL), in application order.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (1, "named caches and entries", include_str!("../../migrations/001_caches.sql")),
    (2, "entry url index", include_str!("../../migrations/002_entry_url_index.sql")),
];

/// Run any pending migrations.
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] naming the migration whose SQL failed.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, description, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("{version} ({description}): {e}")))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version, description, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
