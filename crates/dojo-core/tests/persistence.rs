use chrono::Utc;
use dojo_core::{EncryptionKey, LineagePersistence, RecordStore, SqliteRecordStore};
use dojo_shared::{Decision, Difficulty, InteractionRecord, ProfileType, ScenarioType, Specialization};
use sqlx::sqlite::SqlitePoolOptions;

fn sample_record(session_id: &str, round: u64) -> InteractionRecord {
    InteractionRecord {
        session_id: session_id.to_string(),
        guardian_id: "guard-1".to_string(),
        scenario_id: format!("scenario-{round}"),
        generation: 0,
        round,
        scenario_type: ScenarioType::Phishing,
        profile_type: ProfileType::Senior,
        platform: "Email".to_string(),
        difficulty: Difficulty::Easy,
        decision: Decision::Block,
        confidence: 0.9,
        explanation: "matched phishing pattern".to_string(),
        true_positive: true,
        false_positive: false,
        true_negative: false,
        false_negative: false,
        explanation_quality: 0.7,
        privacy_compliant: true,
        policy_compliant: true,
        evidence_hash: InteractionRecord::compute_evidence_hash(
            session_id,
            "guard-1",
            &format!("scenario-{round}"),
            Decision::Block,
            0.9,
        ),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn record_store_survives_reopen_on_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("integration.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let key = EncryptionKey::generate();

    {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(&url).await.unwrap();
        let store = SqliteRecordStore::new(pool, key.clone()).await.unwrap();
        store.insert(&sample_record("sess-a", 0)).await.unwrap();
        store.insert(&sample_record("sess-a", 1)).await.unwrap();
    }

    let pool = SqlitePoolOptions::new().max_connections(5).connect(&url).await.unwrap();
    let reopened = SqliteRecordStore::new(pool, key).await.unwrap();
    let all = reopened.scan_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(reopened.total_count().await.unwrap(), 2);
    assert_eq!(reopened.count_by_decision(Decision::Block).await.unwrap(), 2);
}

#[tokio::test]
async fn record_store_rejects_wrong_key_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("wrongkey.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(&url).await.unwrap();
        let store = SqliteRecordStore::new(pool, EncryptionKey::generate()).await.unwrap();
        store.insert(&sample_record("sess-b", 0)).await.unwrap();
    }

    let pool = SqlitePoolOptions::new().max_connections(5).connect(&url).await.unwrap();
    let reopened = SqliteRecordStore::new(pool, EncryptionKey::generate()).await.unwrap();
    assert!(reopened.scan_all().await.is_err());
}

#[tokio::test]
async fn lineage_persists_across_loads_with_a_generation_and_a_graduate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lineage.json");
    let persistence = LineagePersistence::new(&path);

    let mut store = persistence.load().await.unwrap();
    assert!(store.prompts.is_empty());

    let seed = dojo_shared::EvolvedPrompt::new_seed(
        "You are a Guardian AI.".to_string(),
        Specialization::ScamDetector,
        Utc::now(),
    );
    store.prompts.push(seed.clone());
    store.graduated.push(dojo_shared::GraduatedGuardian {
        name: "Guardian-ScamDetector-Gen3".to_string(),
        prompt_id: seed.id.clone(),
        generation: 3,
        fitness: 0.91,
        detection_rate: 0.96,
        false_positive_rate: 0.03,
        graduated_at: Utc::now(),
    });
    persistence.save(&store).await.unwrap();

    let reloaded = LineagePersistence::new(&path).load().await.unwrap();
    assert_eq!(reloaded.prompts.len(), 1);
    assert_eq!(reloaded.graduated.len(), 1);
    assert_eq!(reloaded.graduated[0].prompt_id, seed.id);
}
