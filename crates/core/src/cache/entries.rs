//! Cache entry operations for the SQLite backend.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::SqliteCacheStorage;
use super::{CacheStorage, RequestKey};
use crate::Error;
use crate::http::Response;

/// A response stored in a named cache, with the request identity it was
/// stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub cache: String,
    pub method: String,
    pub url: String,
    pub response: Response,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

impl CachedResponse {
    pub fn new(cache: &str, key: &RequestKey, response: Response) -> Self {
        Self {
            cache: cache.to_string(),
            method: key.method.clone(),
            url: key.url.clone(),
            response,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn ensure_cache(conn: &rusqlite::Connection, name: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn upsert_entry(conn: &rusqlite::Connection, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    conn.execute(
        "INSERT INTO cache_entries (
            cache_name, key_hash, method, url, status, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            name,
            key.cache_key(),
            &key.method,
            &key.url,
            i64::from(response.status),
            headers_json,
            response.body.as_ref(),
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[async_trait]
impl CacheStorage for SqliteCacheStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> { ensure_cache(conn, &name) })
            .await
            .map_err(Error::from)
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let name = name.to_string();
        let hash = key.cache_key();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let row = conn.query_row(
                    "SELECT method, url, status, headers_json, body, stored_at
                    FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, hash],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Vec<u8>>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    },
                );

                let (method, url, status, headers_json, body, stored_at) = match row {
                    Ok(r) => r,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
                let headers: Vec<(String, String)> =
                    serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;

                Ok(Some(CachedResponse {
                    cache: name,
                    method,
                    url,
                    response: Response { status, headers, body: body.into() },
                    stored_at,
                }))
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let name = name.to_string();
        let key = key.clone();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_cache(&tx, &name)?;
                upsert_entry(&tx, &name, &key, &response)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        let name = name.to_string();
        let entries = entries.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_cache(&tx, &name)?;
                for (key, response) in &entries {
                    upsert_entry(&tx, &name, key, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
