use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::enums::{Decision, Difficulty, ProfileType, ScenarioType};

/// One (guardian, scenario) evaluation outcome.
///
/// Invariant: exactly one of `true_positive`/`false_positive`/
/// `true_negative`/`false_negative` is true. `evidence_hash` is reproducible
/// from the public fields via [`InteractionRecord::compute_evidence_hash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub session_id: String,
    pub guardian_id: String,
    pub scenario_id: String,
    pub generation: u64,
    pub round: u64,

    pub scenario_type: ScenarioType,
    pub profile_type: ProfileType,
    pub platform: String,
    pub difficulty: Difficulty,

    pub decision: Decision,
    /// Clamped to [0, 1] at parse time.
    pub confidence: f64,
    pub explanation: String,

    pub true_positive: bool,
    pub false_positive: bool,
    pub true_negative: bool,
    pub false_negative: bool,

    /// Explanation quality score in [0, 1].
    pub explanation_quality: f64,
    pub privacy_compliant: bool,
    pub policy_compliant: bool,

    pub evidence_hash: String,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    /// Compound identifier `sessionId-guardianId-scenarioId`.
    #[must_use]
    pub fn id(&self) -> String {
        Self::compound_id(&self.session_id, &self.guardian_id, &self.scenario_id)
    }

    #[must_use]
    pub fn compound_id(session_id: &str, guardian_id: &str, scenario_id: &str) -> String {
        format!("{session_id}-{guardian_id}-{scenario_id}")
    }

    /// Hex SHA-256 of `sessionId‖guardianId‖scenarioId‖decision‖confidence`.
    /// Confidence is rendered with six decimal digits so the hash is a pure
    /// function of the field values, not of float formatting noise.
    #[must_use]
    pub fn compute_evidence_hash(
        session_id: &str,
        guardian_id: &str,
        scenario_id: &str,
        decision: Decision,
        confidence: f64,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(session_id.as_bytes());
        hasher.update(guardian_id.as_bytes());
        hasher.update(scenario_id.as_bytes());
        hasher.update(decision.to_string().as_bytes());
        hasher.update(format!("{confidence:.6}").as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Checks the exactly-one-classification invariant; exposed for tests
    /// and storage-layer assertions.
    #[must_use]
    pub fn exactly_one_classification(&self) -> bool {
        [
            self.true_positive,
            self.false_positive,
            self.true_negative,
            self.false_negative,
        ]
        .iter()
        .filter(|b| **b)
        .count()
            == 1
    }
}
