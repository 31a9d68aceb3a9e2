//! Durable lineage persistence: write-to-`.tmp`-then-rename so a crash
//! mid-write never corrupts the previously committed file.

use std::path::{Path, PathBuf};

use dojo_shared::{DojoError, DojoResult, LineageStore};

pub struct LineagePersistence {
    path: PathBuf,
}

impl LineagePersistence {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the lineage file if present, or an empty store if not.
    pub async fn load(&self) -> DojoResult<LineageStore> {
        if !self.path.exists() {
            return Ok(LineageStore::new());
        }
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DojoError::Serialization(format!("failed to read lineage file: {e}")))?;
        serde_json::from_slice(&bytes).map_err(DojoError::from)
    }

    /// Serializes `store` and commits it via a temp-file-then-rename, the
    /// commit point being the rename itself.
    pub async fn save(&self, store: &LineageStore) -> DojoResult<()> {
        let bytes = serde_json::to_vec_pretty(store)?;
        let tmp_path = tmp_path_for(&self.path);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DojoError::Serialization(format!("failed to create lineage directory: {e}")))?;
        }

        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| DojoError::Serialization(format!("failed to write lineage temp file: {e}")))?;

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| DojoError::Serialization(format!("failed to commit lineage file: {e}")))?;

        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".tmp");
    PathBuf::from(os_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dojo_shared::Specialization;

    #[tokio::test]
    async fn load_missing_file_returns_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = LineagePersistence::new(dir.path().join("nope.json"));
        let store = persistence.load().await.unwrap();
        assert!(store.prompts.is_empty());
        assert!(store.generations.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips_one_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");
        let persistence = LineagePersistence::new(&path);

        let mut store = LineageStore::new();
        store.prompts.push(dojo_shared::EvolvedPrompt::new_seed(
            "seed prompt".into(),
            Specialization::GeneralProtector,
            chrono::Utc::now(),
        ));

        persistence.save(&store).await.unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());

        let loaded = persistence.load().await.unwrap();
        assert_eq!(loaded.prompts.len(), 1);
        assert_eq!(loaded.prompts[0].specialization, Specialization::GeneralProtector);
    }

    #[tokio::test]
    async fn save_overwrites_previous_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");
        let persistence = LineagePersistence::new(&path);

        persistence.save(&LineageStore::new()).await.unwrap();

        let mut store = LineageStore::new();
        store.prompts.push(dojo_shared::EvolvedPrompt::new_seed(
            "another".into(),
            Specialization::ScamDetector,
            chrono::Utc::now(),
        ));
        persistence.save(&store).await.unwrap();

        let loaded = persistence.load().await.unwrap();
        assert_eq!(loaded.prompts.len(), 1);
    }
}
