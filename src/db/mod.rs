pub mod tables;

use chrono::Utc;
use redb::{Database, ReadableTable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{TaskCategory, TaskRecord, TaskStatus};

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode configuration shared by every table
pub const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Serialize a record for storage
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(value, BINCODE_CONFIG)?)
}

/// Deserialize a stored record
///
/// Malformed bytes surface as a deserialization error; stored data is never
/// silently discarded or reset.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(value)
}

/// Open or create the redb database at the given path
///
/// Creates all required tables and runs pending schema migrations. The
/// initial migration installs the default task catalog.
pub fn open_database(path: impl AsRef<Path>) -> Result<Db> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                redb::Error::Io(e)
            })?;
        }
    }

    let db = Database::create(path).map_err(redb::Error::from)?;

    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::EMAILS)?;
        let _ = write_txn.open_table(tables::WITHDRAWALS)?;
        let _ = write_txn.open_table(tables::SESSIONS)?;
        let _ = write_txn.open_table(tables::TASK_STARTS)?;

        // Schema migrations. Version 1 seeds the default task catalog;
        // later migrations bump the version here.
        let mut meta = write_txn.open_table(tables::META)?;
        let version = meta
            .get(tables::SCHEMA_VERSION_KEY)?
            .map(|v| v.value())
            .unwrap_or(0);

        if version < 1 {
            tracing::info!("Migrating schema v{} -> v1: seeding task catalog", version);
            let mut tasks = write_txn.open_table(tables::TASKS)?;
            for task in default_task_catalog(Utc::now().timestamp()) {
                let bytes = encode(&task)?;
                tasks.insert(task.id.as_str(), bytes.as_slice())?;
            }
            meta.insert(tables::SCHEMA_VERSION_KEY, 1u64)?;
        } else {
            let _ = write_txn.open_table(tables::TASKS)?;
        }
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}

/// The task catalog installed on first run
fn default_task_catalog(now: i64) -> Vec<TaskRecord> {
    let seed = |id: &str,
                title: &str,
                description: &str,
                category: TaskCategory,
                points: i64,
                link: &str,
                timer_seconds: u32| TaskRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        points,
        link: link.to_string(),
        timer_seconds,
        status: TaskStatus::Active,
        created_at: now,
    };

    vec![
        seed(
            "seed-1",
            "Watch 2-Minute Video",
            "Watch the full video to earn points.",
            TaskCategory::YoutubeWatch,
            50,
            "https://youtube.com",
            120,
        ),
        seed(
            "seed-2",
            "Subscribe to Tech Channel",
            "Subscribe and stay updated.",
            TaskCategory::YoutubeSub,
            100,
            "https://youtube.com",
            15,
        ),
        seed(
            "seed-3",
            "Follow Facebook Page",
            "Follow our official partner.",
            TaskCategory::FacebookFollow,
            75,
            "https://facebook.com",
            10,
        ),
        seed(
            "seed-4",
            "Follow on TikTok",
            "Get daily shorts.",
            TaskCategory::TiktokFollow,
            80,
            "https://tiktok.com",
            10,
        ),
    ]
}
