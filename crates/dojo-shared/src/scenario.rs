use serde::{Deserialize, Serialize};

use crate::enums::{Decision, Difficulty, ProfileType, ScenarioType};

/// The synthesized (or externally loaded) sender of a scenario's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub display_name: String,
    /// Human string like `"3 months"` / `"2 years"`.
    pub account_age: String,
    pub mutual_connections: u32,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub risk_indicators: Vec<String>,
}

/// The known-correct classification for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTruth {
    pub is_threat: bool,
    pub correct_decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_category: Option<ScenarioType>,
    pub severity: f64,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// An opaque 4-tuple driving the policy oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub category: String,
    pub constraint: String,
    pub value: String,
}

impl PolicyRule {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            constraint: constraint.into(),
            value: value.into(),
        }
    }

    /// Value rendered as `"true"` is treated as boolean-true; booleans are
    /// always rendered as the literal strings `"true"`/`"false"`.
    #[must_use]
    pub fn value_is_true(&self) -> bool {
        self.value == "true"
    }

    /// Value parsed as a decimal integer, defaulting to 0 on malformed input.
    #[must_use]
    pub fn value_as_i64(&self) -> i64 {
        self.value.parse().unwrap_or(0)
    }
}

/// The scenario's non-identifier payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioContext {
    pub scenario_type: ScenarioType,
    pub profile_type: ProfileType,
    pub platform: String,
    pub threat_content: String,
    pub sender_info: SenderProfile,
    pub ground_truth: GroundTruth,
    #[serde(default)]
    pub active_policies: Vec<PolicyRule>,
}

/// A labelled threat-or-benign episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub context: ScenarioContext,
    #[serde(default)]
    pub conversation_history: Vec<String>,
    pub difficulty: Difficulty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_rule_value_helpers() {
        let r = PolicyRule::new("p1", "contacts", "block_strangers", "true");
        assert!(r.value_is_true());
        let r2 = PolicyRule::new("p2", "spending", "max_per_transaction", "0");
        assert!(!r2.value_is_true());
        assert_eq!(r2.value_as_i64(), 0);
    }

    #[test]
    fn scenario_roundtrips() {
        let scenario = Scenario {
            id: "11111111-1111-1111-1111-111111111111".into(),
            context: ScenarioContext {
                scenario_type: ScenarioType::Grooming,
                profile_type: ProfileType::Child,
                platform: "DM".into(),
                threat_content: "hello".into(),
                sender_info: SenderProfile {
                    display_name: "Alex".into(),
                    account_age: "3 days".into(),
                    mutual_connections: 0,
                    is_verified: false,
                    risk_indicators: vec!["new_account".into()],
                },
                ground_truth: GroundTruth {
                    is_threat: true,
                    correct_decision: Decision::Escalate,
                    threat_category: Some(ScenarioType::Grooming),
                    severity: 0.95,
                    patterns: vec!["our secret".into()],
                },
                active_policies: vec![],
            },
            conversation_history: vec!["hi".into()],
            difficulty: Difficulty::Easy,
        };
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(scenario, back);
    }
}
