use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dojo_core::{AppConfig, EncryptionKey, RecordStore, SqliteRecordStore};
use sqlx::sqlite::SqlitePoolOptions;

/// Opens the configured record store, creating the database file and its
/// parent directory if needed. The AES key lives in a sidecar file next to
/// the database so a resumed CLI session can decrypt records written by an
/// earlier one.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let key = load_or_create_key(&config.db_path).await?;

    let url = format!("sqlite://{}?mode=rwc", config.db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;

    let store = SqliteRecordStore::new(pool, key)
        .await
        .context("failed to migrate record store")?;
    Ok(Arc::new(store))
}

async fn load_or_create_key(db_path: &Path) -> anyhow::Result<EncryptionKey> {
    let key_path = key_sidecar_path(db_path);
    if let Ok(hex_str) = tokio::fs::read_to_string(&key_path).await {
        return EncryptionKey::from_hex(hex_str.trim())
            .with_context(|| format!("corrupt encryption key at {}", key_path.display()));
    }

    let key = EncryptionKey::generate();
    tokio::fs::write(&key_path, key.to_hex())
        .await
        .with_context(|| format!("failed to write encryption key to {}", key_path.display()))?;
    Ok(key)
}

fn key_sidecar_path(db_path: &Path) -> std::path::PathBuf {
    let mut name = db_path.file_name().map_or_else(
        || std::ffi::OsString::from("guardian_dojo.db"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".key");
    db_path.with_file_name(name)
}
