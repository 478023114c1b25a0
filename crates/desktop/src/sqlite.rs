//! SQLite-backed persistence for the inventory snapshot and preferences.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::{Builder, Runtime};

use stockscan_inventory::Item;

use crate::gateway::{PersistenceError, PersistenceGateway};

/// Row name of the inventory snapshot in the `snapshots` table.
const INVENTORY_SNAPSHOT: &str = "inventory";

/// Local SQLite database holding the whole inventory as one JSON snapshot.
///
/// The domain is synchronous, so the gateway owns a current-thread runtime and
/// blocks on every query.
#[derive(Debug)]
pub struct SqliteGateway {
    runtime: Runtime,
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteGateway {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PersistenceError::Runtime(e.to_string()))?;

        let pool = runtime
            .block_on(connect(&path))
            .map_err(|e| PersistenceError::Storage(format!("{e:#}")))?;

        tracing::debug!(path = %path.display(), "opened inventory database");
        Ok(Self { runtime, pool, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the inventory snapshot was last written, if ever.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        let result: anyhow::Result<Option<DateTime<Utc>>> = self.runtime.block_on(async {
            let row = sqlx::query(
                r#"
                SELECT saved_at
                FROM snapshots
                WHERE name = ?1
                "#,
            )
            .bind(INVENTORY_SNAPSHOT)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch snapshot timestamp")?;

            let Some(row) = row else {
                return Ok(None);
            };

            let saved_at: String = row.try_get("saved_at")?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .map(|dt| dt.with_timezone(&Utc))
                .context("invalid saved_at timestamp in snapshots")?;
            Ok(Some(saved_at))
        });

        result.unwrap_or_else(|err| {
            tracing::warn!("failed to read snapshot timestamp: {err:#}");
            None
        })
    }

    async fn read_snapshot(&self) -> anyhow::Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM snapshots
            WHERE name = ?1
            "#,
        )
        .bind(INVENTORY_SNAPSHOT)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch inventory snapshot")?;

        match row {
            Some(row) => Ok(Some(row.try_get("data")?)),
            None => Ok(None),
        }
    }

    async fn write_snapshot(&self, payload: &str) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO snapshots (name, data, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(name)
            DO UPDATE SET
                data = excluded.data,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(INVENTORY_SNAPSHOT)
        .bind(payload)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("failed to upsert inventory snapshot")?;

        Ok(())
    }
}

/// Decode a snapshot entry by entry; unreadable entries are logged and skipped.
fn decode_snapshot(payload: &str) -> Vec<Item> {
    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(payload) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("discarding unreadable inventory snapshot: {err}");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Item>(entry) {
            Ok(item) => Some(item),
            Err(err) => {
                tracing::warn!(index, "dropping unreadable stored item: {err}");
                None
            }
        })
        .collect()
}

impl Drop for SqliteGateway {
    fn drop(&mut self) {
        // Connections must be closed while the owning runtime is still alive.
        self.runtime.block_on(self.pool.close());
    }
}

async fn connect(path: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory at {parent:?}"))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite database at {path:?}"))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS snapshots (
            name      TEXT PRIMARY KEY,
            data      TEXT NOT NULL,
            saved_at  TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create snapshots table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .context("failed to create preferences table")?;

    Ok(pool)
}

impl PersistenceGateway for SqliteGateway {
    fn load(&self) -> Vec<Item> {
        let payload = match self.runtime.block_on(self.read_snapshot()) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!("failed to load inventory snapshot: {err:#}");
                return Vec::new();
            }
        };

        decode_snapshot(&payload)
    }

    fn save(&self, items: &[Item]) -> Result<(), PersistenceError> {
        let payload =
            serde_json::to_string(items).map_err(|e| PersistenceError::Serialize(e.to_string()))?;

        self.runtime
            .block_on(self.write_snapshot(&payload))
            .map_err(|e| PersistenceError::Storage(format!("{e:#}")))
    }

    fn load_preference(&self, key: &str) -> Option<String> {
        let result: anyhow::Result<Option<String>> = self.runtime.block_on(async {
            let row = sqlx::query(
                r#"
                SELECT value
                FROM preferences
                WHERE key = ?1
                "#,
            )
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch preference")?;

            match row {
                Some(row) => Ok(Some(row.try_get("value")?)),
                None => Ok(None),
            }
        });

        result.unwrap_or_else(|err| {
            tracing::warn!(key, "failed to read preference: {err:#}");
            None
        })
    }

    fn save_preference(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.runtime
            .block_on(async {
                sqlx::query(
                    r#"
                    INSERT INTO preferences (key, value)
                    VALUES (?1, ?2)
                    ON CONFLICT(key)
                    DO UPDATE SET value = excluded.value
                    "#,
                )
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await
                .context("failed to upsert preference")?;

                Ok::<(), anyhow::Error>(())
            })
            .map_err(|e| PersistenceError::Storage(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stockscan_core::Barcode;

    fn temp_db() -> PathBuf {
        std::env::temp_dir()
            .join("stockscan-tests")
            .join(format!("{}.db", uuid::Uuid::now_v7()))
    }

    fn item(code: &str, qty: u32) -> Item {
        Item::new(Barcode::parse(code).unwrap(), "Widget", "Parts", qty, Decimal::new(199, 2), 3)
            .unwrap()
    }

    #[test]
    fn fresh_database_loads_empty() {
        let gateway = SqliteGateway::open(temp_db()).unwrap();
        assert!(gateway.load().is_empty());
        assert_eq!(gateway.last_saved_at(), None);
    }

    #[test]
    fn save_then_reopen_restores_items_in_order() {
        let path = temp_db();
        let items = vec![item("b", 1), item("a", 2)];

        {
            let gateway = SqliteGateway::open(&path).unwrap();
            gateway.save(&items).unwrap();
            assert!(gateway.last_saved_at().is_some());
        }

        let reopened = SqliteGateway::open(&path).unwrap();
        assert_eq!(reopened.load(), items);
    }

    #[test]
    fn later_save_replaces_snapshot() {
        let gateway = SqliteGateway::open(temp_db()).unwrap();
        gateway.save(&[item("a", 1), item("b", 1)]).unwrap();
        gateway.save(&[item("c", 5)]).unwrap();

        let loaded = gateway.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].barcode().as_str(), "c");
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let gateway = SqliteGateway::open(temp_db()).unwrap();
        gateway
            .runtime
            .block_on(gateway.write_snapshot("{not json"))
            .unwrap();

        assert!(gateway.load().is_empty());
    }

    #[test]
    fn unreadable_entries_are_dropped_one_by_one() {
        let gateway = SqliteGateway::open(temp_db()).unwrap();
        let payload = r#"[
            {"barcode":"good","name":"Widget","category":"Parts","quantity":4,"price":"1.99","reorder":3},
            {"barcode":"","name":"Blank","category":"","quantity":1,"price":"1","reorder":5},
            {"barcode":"nan","name":"Legacy","category":"","quantity":null,"price":null,"reorder":5},
            {"barcode":"neg","name":"Negative","category":"","quantity":-2,"price":"1","reorder":5}
        ]"#;
        gateway
            .runtime
            .block_on(gateway.write_snapshot(payload))
            .unwrap();

        let loaded = gateway.load();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].barcode().as_str(), "good");
        assert_eq!(loaded[0].quantity(), 4);
    }

    #[test]
    fn preferences_round_trip() {
        let gateway = SqliteGateway::open(temp_db()).unwrap();
        assert_eq!(gateway.load_preference("theme"), None);

        gateway.save_preference("theme", "dark").unwrap();
        gateway.save_preference("theme", "light").unwrap();

        assert_eq!(gateway.load_preference("theme").as_deref(), Some("light"));
    }
}
