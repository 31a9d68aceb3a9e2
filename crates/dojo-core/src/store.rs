//! The encrypted record store. Append-only table of
//! [`InteractionRecord`]s with indexes on session/guardian/generation/decision;
//! public identifiers live in plaintext columns, the full record
//! serialization lives in an AES-256-GCM encrypted blob with a random
//! 96-bit nonce per insert (invariant: `encrypt(x) != encrypt(x)` as
//! ciphertexts, `decrypt(encrypt(x)) == x`).

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use dojo_shared::{Decision, DojoError, DojoResult, InteractionRecord};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tokio::time::{timeout, Duration};

const DB_TIMEOUT_SECS: u64 = 10;
const NONCE_LEN: usize = 12;

/// The storage seam the arena and the CLI's `stats` command program against.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &InteractionRecord) -> DojoResult<()>;
    async fn scan_all(&self) -> DojoResult<Vec<InteractionRecord>>;
    async fn scan_by_guardian(&self, guardian_id: &str) -> DojoResult<Vec<InteractionRecord>>;
    async fn scan_by_generation(&self, generation: u64) -> DojoResult<Vec<InteractionRecord>>;
    async fn total_count(&self) -> DojoResult<i64>;
    async fn count_by_decision(&self, decision: Decision) -> DojoResult<i64>;
}

/// A 256-bit AES-GCM key. Either generated fresh in-process (ephemeral
/// store) or loaded from a sidecar file next to the database.
#[derive(Clone)]
pub struct EncryptionKey(Arc<[u8; 32]>);

impl EncryptionKey {
    #[must_use]
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        Self(Arc::new(key.into()))
    }

    /// Load a key from its 32-byte hex-encoded representation, generating
    /// and returning a new one if `hex` is `None`.
    pub fn from_hex(hex_str: &str) -> DojoResult<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| DojoError::Storage(format!("invalid key encoding: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DojoError::Storage("encryption key must be 32 bytes".to_string()))?;
        Ok(Self(Arc::new(arr)))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(*self.0)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.0.as_ref()))
    }
}

pub struct SqliteRecordStore {
    pool: SqlitePool,
    key: EncryptionKey,
}

impl SqliteRecordStore {
    pub async fn new(pool: SqlitePool, key: EncryptionKey) -> DojoResult<Self> {
        let store = Self { pool, key };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> DojoResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS interaction_records (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                guardian_id TEXT NOT NULL,
                generation INTEGER NOT NULL,
                round INTEGER NOT NULL,
                scenario_id TEXT NOT NULL,
                scenario_type TEXT NOT NULL,
                profile_type TEXT NOT NULL,
                decision TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DojoError::Storage(format!("failed to create table: {e}")))?;

        for (name, column) in [
            ("idx_records_session", "session_id"),
            ("idx_records_guardian", "guardian_id"),
            ("idx_records_generation", "generation"),
            ("idx_records_decision", "decision"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON interaction_records({column})"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| DojoError::Storage(format!("failed to create index {name}: {e}")))?;
        }
        Ok(())
    }

    fn encrypt(&self, record: &InteractionRecord) -> DojoResult<String> {
        let plaintext = serde_json::to_vec(record)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .key
            .cipher()
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| DojoError::Storage(format!("encryption failed: {e}")))?;
        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(nonce.as_slice());
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    fn decrypt(&self, blob_hex: &str) -> DojoResult<InteractionRecord> {
        let blob = hex::decode(blob_hex)
            .map_err(|e| DojoError::Storage(format!("corrupt encrypted blob: {e}")))?;
        if blob.len() < NONCE_LEN {
            return Err(DojoError::Storage("encrypted blob too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self
            .key
            .cipher()
            .decrypt(nonce, ciphertext)
            .map_err(|e| DojoError::Storage(format!("decryption failed: {e}")))?;
        serde_json::from_slice(&plaintext).map_err(DojoError::from)
    }

    async fn rows_to_records(&self, rows: Vec<sqlx::sqlite::SqliteRow>) -> DojoResult<Vec<InteractionRecord>> {
        rows.into_iter()
            .map(|row| {
                let blob: String = row.try_get("data").map_err(|e| {
                    DojoError::Storage(format!("missing data column: {e}"))
                })?;
                self.decrypt(&blob)
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, record: &InteractionRecord) -> DojoResult<()> {
        if record.session_id.contains('\0') || record.guardian_id.contains('\0') {
            return Err(DojoError::Storage(
                "identifiers must not contain null bytes".to_string(),
            ));
        }
        let blob = self.encrypt(record)?;
        let id = record.id();

        let query_future = sqlx::query(
            r"
            INSERT OR REPLACE INTO interaction_records
                (id, session_id, guardian_id, generation, round, scenario_id,
                 scenario_type, profile_type, decision, data, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&id)
        .bind(&record.session_id)
        .bind(&record.guardian_id)
        .bind(record.generation as i64)
        .bind(record.round as i64)
        .bind(&record.scenario_id)
        .bind(record.scenario_type.to_string())
        .bind(record.profile_type.to_string())
        .bind(record.decision.to_string())
        .bind(blob)
        .bind(record.timestamp.to_rfc3339())
        .execute(&self.pool);

        timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage(format!("insert timed out after {DB_TIMEOUT_SECS}s")))?
            .map_err(|e| DojoError::Storage(format!("failed to insert record '{id}': {e}")))?;
        Ok(())
    }

    async fn scan_all(&self) -> DojoResult<Vec<InteractionRecord>> {
        let query_future =
            sqlx::query("SELECT data FROM interaction_records ORDER BY created_at").fetch_all(&self.pool);
        let rows = timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage("scan_all timed out".to_string()))?
            .map_err(|e| DojoError::Storage(format!("scan_all failed: {e}")))?;
        self.rows_to_records(rows).await
    }

    async fn scan_by_guardian(&self, guardian_id: &str) -> DojoResult<Vec<InteractionRecord>> {
        let query_future = sqlx::query(
            "SELECT data FROM interaction_records WHERE guardian_id = ? ORDER BY round",
        )
        .bind(guardian_id)
        .fetch_all(&self.pool);
        let rows = timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage("scan_by_guardian timed out".to_string()))?
            .map_err(|e| DojoError::Storage(format!("scan_by_guardian failed: {e}")))?;
        self.rows_to_records(rows).await
    }

    async fn scan_by_generation(&self, generation: u64) -> DojoResult<Vec<InteractionRecord>> {
        let query_future = sqlx::query(
            "SELECT data FROM interaction_records WHERE generation = ? ORDER BY round",
        )
        .bind(generation as i64)
        .fetch_all(&self.pool);
        let rows = timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage("scan_by_generation timed out".to_string()))?
            .map_err(|e| DojoError::Storage(format!("scan_by_generation failed: {e}")))?;
        self.rows_to_records(rows).await
    }

    async fn total_count(&self) -> DojoResult<i64> {
        let query_future =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM interaction_records")
                .fetch_one(&self.pool);
        let (count,) = timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage("total_count timed out".to_string()))?
            .map_err(|e| DojoError::Storage(format!("total_count failed: {e}")))?;
        Ok(count)
    }

    async fn count_by_decision(&self, decision: Decision) -> DojoResult<i64> {
        let query_future = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM interaction_records WHERE decision = ?",
        )
        .bind(decision.to_string())
        .fetch_one(&self.pool);
        let (count,) = timeout(Duration::from_secs(DB_TIMEOUT_SECS), query_future)
            .await
            .map_err(|_| DojoError::Storage("count_by_decision timed out".to_string()))?
            .map_err(|e| DojoError::Storage(format!("count_by_decision failed: {e}")))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dojo_shared::{Difficulty, ProfileType, ScenarioType};

    fn sample_record(session: &str, guardian: &str, round: u64) -> InteractionRecord {
        InteractionRecord {
            session_id: session.to_string(),
            guardian_id: guardian.to_string(),
            scenario_id: format!("scenario-{round}"),
            generation: 0,
            round,
            scenario_type: ScenarioType::Grooming,
            profile_type: ProfileType::Child,
            platform: "DM".to_string(),
            difficulty: Difficulty::Easy,
            decision: Decision::Escalate,
            confidence: 0.9,
            explanation: "matched pattern".to_string(),
            true_positive: true,
            false_positive: false,
            true_negative: false,
            false_negative: false,
            explanation_quality: 0.8,
            privacy_compliant: true,
            policy_compliant: true,
            evidence_hash: InteractionRecord::compute_evidence_hash(
                session,
                guardian,
                &format!("scenario-{round}"),
                Decision::Escalate,
                0.9,
            ),
            timestamp: Utc::now(),
        }
    }

    async fn fresh_store() -> SqliteRecordStore {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteRecordStore::new(pool, EncryptionKey::generate())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_and_scan_roundtrip() {
        let store = fresh_store().await;
        let record = sample_record("sess1", "guard1", 0);
        store.insert(&record).await.unwrap();
        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], record);
    }

    #[tokio::test]
    async fn insert_is_idempotent_by_record_id() {
        let store = fresh_store().await;
        let mut record = sample_record("sess1", "guard1", 0);
        store.insert(&record).await.unwrap();
        record.confidence = 0.42;
        store.insert(&record).await.unwrap();
        let all = store.scan_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].confidence, 0.42);
    }

    #[tokio::test]
    async fn scan_by_guardian_orders_by_round() {
        let store = fresh_store().await;
        store.insert(&sample_record("sess1", "guardA", 2)).await.unwrap();
        store.insert(&sample_record("sess1", "guardA", 0)).await.unwrap();
        store.insert(&sample_record("sess1", "guardA", 1)).await.unwrap();
        let rows = store.scan_by_guardian("guardA").await.unwrap();
        let rounds: Vec<u64> = rows.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn count_by_decision_and_total_count() {
        let store = fresh_store().await;
        store.insert(&sample_record("sess1", "g1", 0)).await.unwrap();
        store.insert(&sample_record("sess1", "g2", 1)).await.unwrap();
        assert_eq!(store.total_count().await.unwrap(), 2);
        assert_eq!(store.count_by_decision(Decision::Escalate).await.unwrap(), 2);
        assert_eq!(store.count_by_decision(Decision::Allow).await.unwrap(), 0);
    }

    #[test]
    fn encryption_uses_random_nonce_but_decrypts_to_same_bytes() {
        let key = EncryptionKey::generate();
        let store = SqliteRecordStore {
            pool: futures::executor::block_on(SqlitePool::connect("sqlite::memory:")).unwrap(),
            key,
        };
        let record = sample_record("s", "g", 0);
        let blob_a = store.encrypt(&record).unwrap();
        let blob_b = store.encrypt(&record).unwrap();
        assert_ne!(blob_a, blob_b, "ciphertexts must differ due to random nonce");
        assert_eq!(store.decrypt(&blob_a).unwrap(), record);
        assert_eq!(store.decrypt(&blob_b).unwrap(), record);
    }

    #[test]
    fn key_hex_roundtrip() {
        let key = EncryptionKey::generate();
        let hex_str = key.to_hex();
        let restored = EncryptionKey::from_hex(&hex_str).unwrap();
        assert_eq!(key.to_hex(), restored.to_hex());
    }
}
