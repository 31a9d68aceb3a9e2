use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::enums::Specialization;

/// A prompt configuration in the evolving population.
///
/// Invariant: `id` is a pure function of `text` — two `EvolvedPrompt`s
/// built from identical text always carry identical ids, via
/// [`EvolvedPrompt::compute_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolvedPrompt {
    pub id: String,
    pub generation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub text: String,
    pub specialization: Specialization,
    pub fitness: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub mutation_description: String,
    pub created_at: DateTime<Utc>,
}

impl EvolvedPrompt {
    /// Content-addressed identifier = hex SHA-256(prompt text).
    #[must_use]
    pub fn compute_id(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    #[must_use]
    pub fn new_seed(text: String, specialization: Specialization, now: DateTime<Utc>) -> Self {
        let id = Self::compute_id(&text);
        Self {
            id,
            generation: 0,
            parent_id: None,
            text,
            specialization,
            fitness: 0.0,
            detection_rate: 0.0,
            false_positive_rate: 0.0,
            mutation_description: "seed".to_string(),
            created_at: now,
        }
    }
}

/// Per-generation rollup persisted into the lineage store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generation: u64,
    pub population_size: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    pub best_detection_rate: f64,
    pub best_false_positive_rate: f64,
    pub distinct_specializations: usize,
    pub specialization_histogram: HashMap<String, usize>,
    #[serde(default)]
    pub monoculture_events: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A prompt that graduated: met detection/FPR/revocation/explanation
/// thresholds for the required number of generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduatedGuardian {
    pub name: String,
    pub prompt_id: String,
    pub generation: u64,
    pub fitness: f64,
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub graduated_at: DateTime<Utc>,
}

/// The durable history of all prompts and generation summaries
/// Serialized atomically as ordered-field JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageStore {
    pub prompts: Vec<EvolvedPrompt>,
    pub generations: Vec<GenerationSummary>,
    #[serde(default)]
    pub graduated: Vec<GraduatedGuardian>,
}

impl LineageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-fitness prompts of the last generation evaluated, used by the
    /// controller to seed a resumed run.
    #[must_use]
    pub fn latest_generation_number(&self) -> Option<u64> {
        self.generations.last().map(|g| g.generation)
    }

    /// Prompts belonging to exactly the given generation, in append order.
    #[must_use]
    pub fn prompts_in_generation(&self, generation: u64) -> Vec<&EvolvedPrompt> {
        self.prompts
            .iter()
            .filter(|p| p.generation == generation)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_pure_function_of_text() {
        let a = EvolvedPrompt::compute_id("You are a Guardian.");
        let b = EvolvedPrompt::compute_id("You are a Guardian.");
        assert_eq!(a, b);
        let c = EvolvedPrompt::compute_id("You are a different Guardian.");
        assert_ne!(a, c);
    }

    #[test]
    fn lineage_store_roundtrips() {
        let now = Utc::now();
        let mut store = LineageStore::new();
        store.prompts.push(EvolvedPrompt::new_seed(
            "seed prompt".into(),
            Specialization::GeneralProtector,
            now,
        ));
        let json = serde_json::to_string(&store).unwrap();
        let back: LineageStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.prompts.len(), 1);
        assert_eq!(back.prompts[0].specialization, Specialization::GeneralProtector);
    }
}
