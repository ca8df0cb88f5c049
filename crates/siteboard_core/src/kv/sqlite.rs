//! Durable slot store over the migrated `kv_slots` table.
//!
//! Removed slots stay behind as rows with a `NULL` payload so their version
//! counter survives.

use super::{KeyValueStore, Slot, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

/// SQLite-backed slot store. Borrows a connection opened via `db::open_db*`.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists stored slot names in ascending order.
    pub fn slot_names(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM kv_slots WHERE payload IS NOT NULL ORDER BY name ASC;",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn current_version(&self, key: &str) -> StoreResult<u64> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM kv_slots WHERE name = ?1 AND payload IS NOT NULL;",
                [key],
                |row| row.get::<_, u64>(0),
            )
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    fn conflict(&self, key: &str, expected: u64) -> StoreResult<u64> {
        Err(StoreError::Conflict {
            key: key.to_string(),
            expected,
            found: self.current_version(key)?,
        })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn read_slot(&self, key: &str) -> StoreResult<Option<Slot>> {
        let slot = self
            .conn
            .query_row(
                "SELECT payload, version FROM kv_slots WHERE name = ?1 AND payload IS NOT NULL;",
                [key],
                |row| {
                    Ok(Slot {
                        payload: row.get("payload")?,
                        version: row.get("version")?,
                    })
                },
            )
            .optional()?;
        Ok(slot)
    }

    fn write_slot(
        &self,
        key: &str,
        payload: &str,
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let written = match expected_version {
            None => self
                .conn
                .query_row(
                    "INSERT INTO kv_slots (name, payload, version, updated_at)
                     VALUES (?1, ?2, 1, ?3)
                     ON CONFLICT(name) DO UPDATE SET
                        payload = excluded.payload,
                        version = kv_slots.version + 1,
                        updated_at = excluded.updated_at
                     RETURNING version;",
                    params![key, payload, now_ms],
                    |row| row.get::<_, u64>(0),
                )
                .optional()?,
            Some(0) => self
                .conn
                .query_row(
                    "INSERT INTO kv_slots (name, payload, version, updated_at)
                     VALUES (?1, ?2, 1, ?3)
                     ON CONFLICT(name) DO UPDATE SET
                        payload = excluded.payload,
                        version = kv_slots.version + 1,
                        updated_at = excluded.updated_at
                     WHERE kv_slots.payload IS NULL
                     RETURNING version;",
                    params![key, payload, now_ms],
                    |row| row.get::<_, u64>(0),
                )
                .optional()?,
            Some(expected) => self
                .conn
                .query_row(
                    "UPDATE kv_slots
                     SET
                        payload = ?2,
                        version = version + 1,
                        updated_at = ?3
                     WHERE name = ?1
                       AND version = ?4
                       AND payload IS NOT NULL
                     RETURNING version;",
                    params![key, payload, now_ms, expected],
                    |row| row.get::<_, u64>(0),
                )
                .optional()?,
        };

        match (written, expected_version) {
            (Some(version), _) => Ok(version),
            (None, Some(expected)) => self.conflict(key, expected),
            (None, None) => Err(StoreError::Db(rusqlite::Error::QueryReturnedNoRows.into())),
        }
    }

    fn remove_slot(&self, key: &str) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE kv_slots
             SET
                payload = NULL,
                version = version + 1,
                updated_at = ?2
             WHERE name = ?1
               AND payload IS NOT NULL;",
            params![key, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}
