//! Reduces a record sequence to a six-dimensional score.

use dojo_shared::InteractionRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct FitnessWeights {
    pub detection: f64,
    pub false_positive: f64,
    pub privacy: f64,
    pub revocation: f64,
    pub explanation: f64,
    pub policy: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            detection: 0.35,
            false_positive: 0.20,
            privacy: 0.15,
            revocation: 0.10,
            explanation: 0.10,
            policy: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitnessReport {
    pub detection_rate: f64,
    pub false_positive_rate: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub privacy_score: f64,
    /// Structural constant — revocation behavior lives outside the
    /// InteractionRecord sequence this evaluator sees, so it is always 1.0
    /// here.
    pub revocation_score: f64,
    pub explanation_score: f64,
    pub policy_score: f64,
    pub total_fitness: f64,
    pub scenarios_evaluated: usize,
}

#[must_use]
pub fn evaluate(records: &[InteractionRecord], weights: &FitnessWeights) -> FitnessReport {
    if records.is_empty() {
        return FitnessReport::default();
    }

    let tp = records.iter().filter(|r| r.true_positive).count() as f64;
    let fp = records.iter().filter(|r| r.false_positive).count() as f64;
    let tn = records.iter().filter(|r| r.true_negative).count() as f64;
    let fn_ = records.iter().filter(|r| r.false_negative).count() as f64;

    let detection_rate = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 1.0 };
    let false_positive_rate = if fp + tn > 0.0 { fp / (fp + tn) } else { 0.0 };
    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 1.0 };
    let recall = detection_rate;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    // Privacy score is the mean of privacy_compliant flags; the empty-input
    // guard above means the denominator is never zero here.
    let privacy_score =
        records.iter().filter(|r| r.privacy_compliant).count() as f64 / records.len() as f64;
    let revocation_score = 1.0;
    let explanation_score =
        records.iter().map(|r| r.explanation_quality).sum::<f64>() / records.len() as f64;
    let policy_score =
        records.iter().filter(|r| r.policy_compliant).count() as f64 / records.len() as f64;

    let total_fitness = weights.detection * detection_rate
        + weights.false_positive * (1.0 - false_positive_rate)
        + weights.privacy * privacy_score
        + weights.revocation * revocation_score
        + weights.explanation * explanation_score
        + weights.policy * policy_score;

    FitnessReport {
        detection_rate,
        false_positive_rate,
        precision,
        recall,
        f1,
        privacy_score,
        revocation_score,
        explanation_score,
        policy_score,
        total_fitness,
        scenarios_evaluated: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dojo_shared::{Decision, Difficulty, ProfileType, ScenarioType};

    fn record(tp: bool, fp: bool, tn: bool, fn_: bool, explanation_quality: f64) -> InteractionRecord {
        InteractionRecord {
            session_id: "s".into(),
            guardian_id: "g".into(),
            scenario_id: "sc".into(),
            generation: 0,
            round: 0,
            scenario_type: ScenarioType::Phishing,
            profile_type: ProfileType::Senior,
            platform: "Email".into(),
            difficulty: Difficulty::Easy,
            decision: if tp || fp { Decision::Block } else { Decision::Allow },
            confidence: 0.8,
            explanation: "because it matched known patterns".into(),
            true_positive: tp,
            false_positive: fp,
            true_negative: tn,
            false_negative: fn_,
            explanation_quality,
            privacy_compliant: true,
            policy_compliant: true,
            evidence_hash: "hash".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_all_zeros() {
        let report = evaluate(&[], &FitnessWeights::default());
        assert_eq!(report, FitnessReport::default());
    }

    #[test]
    fn perfect_classifier_scores_above_point_nine() {
        let mut records = Vec::new();
        for _ in 0..70 {
            records.push(record(true, false, false, false, 1.0));
        }
        for _ in 0..30 {
            records.push(record(false, false, true, false, 1.0));
        }
        let report = evaluate(&records, &FitnessWeights::default());
        assert_eq!(report.detection_rate, 1.0);
        assert_eq!(report.false_positive_rate, 0.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.f1, 1.0);
        assert!(report.total_fitness > 0.9);
    }

    #[test]
    fn f1_calculation_matches_worked_example() {
        let mut records = Vec::new();
        for _ in 0..80 {
            records.push(record(true, false, false, false, 0.5));
        }
        for _ in 0..20 {
            records.push(record(false, false, false, true, 0.5));
        }
        for _ in 0..10 {
            records.push(record(false, true, false, false, 0.5));
        }
        for _ in 0..40 {
            records.push(record(false, false, true, false, 0.5));
        }
        let report = evaluate(&records, &FitnessWeights::default());
        assert!((report.detection_rate - 0.80).abs() < 1e-9);
        assert!((report.false_positive_rate - 0.20).abs() < 1e-9);
        assert!((report.precision - 80.0 / 90.0).abs() < 1e-9);
        assert!(report.f1 > 0.0 && report.f1 < 1.0);
    }

    #[test]
    fn scenarios_evaluated_equals_record_count() {
        let records = vec![record(true, false, false, false, 1.0)];
        let report = evaluate(&records, &FitnessWeights::default());
        assert_eq!(report.scenarios_evaluated, 1);
    }
}
