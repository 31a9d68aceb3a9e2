//! Runs one guardian against one scenario: prompt construction, backend
//! call, lenient response parsing, classification, policy checks,
//! explanation scoring, and record emission.

use chrono::Utc;
use dojo_shared::{Decision, InteractionRecord, Scenario};

use crate::guardian::Guardian;
use crate::oracles::{self, PolicyResult};
use crate::scenarios::ScenarioGenerator;
use crate::store::RecordStore;

const REASONING_KEYWORDS: [&str; 10] = [
    "because", "detected", "pattern", "indicates", "suggests", "risk", "safe", "concern",
    "threat", "protect",
];
const JARGON_KEYWORDS: [&str; 5] = ["tensor", "embedding", "neural", "gradient", "epoch"];

const RESPONSE_FORMAT_CLAUSE: &str = "Respond in exactly this format:\nDECISION: <BLOCK|ALLOW|ALERT|LOG|ESCALATE>\nCONFIDENCE: <float in [0,1]>\nEXPLANATION: <free text>";

/// The outcome of a single round: the persisted record plus the policy
/// result the caller may want to surface or log separately.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub record: InteractionRecord,
    pub policy_result: PolicyResult,
}

pub struct ParsedResponse {
    pub decision: Decision,
    pub confidence: f64,
    pub explanation: String,
}

/// Builds the text sent to the guardian for one scenario round.
#[must_use]
pub fn build_evaluation_prompt(scenario: &Scenario) -> String {
    let context = &scenario.context;
    let sender = &context.sender_info;

    let mut prompt = String::new();
    prompt.push_str(&format!("Platform: {}\n", context.platform));
    prompt.push_str(&format!(
        "Sender: {} (account age: {}, mutual connections: {}, verified: {})\n",
        sender.display_name, sender.account_age, sender.mutual_connections, sender.is_verified
    ));
    if !sender.risk_indicators.is_empty() {
        prompt.push_str(&format!("Risk indicators: {}\n", sender.risk_indicators.join(", ")));
    }
    prompt.push_str(&format!("Content: {}\n", context.threat_content));

    if !scenario.conversation_history.is_empty() {
        prompt.push_str("Conversation history:\n");
        for line in &scenario.conversation_history {
            prompt.push_str(&format!("- {line}\n"));
        }
    }

    if !context.active_policies.is_empty() {
        prompt.push_str("Active policies:\n");
        for rule in &context.active_policies {
            prompt.push_str(&format!(
                "- {}/{} = {}\n",
                rule.category, rule.constraint, rule.value
            ));
        }
    }

    prompt.push_str(RESPONSE_FORMAT_CLAUSE);
    prompt
}

/// Scans `response` for `DECISION:`/`CONFIDENCE:`/`EXPLANATION:` prefixed
/// lines, falling back to lenient substring matching. Never fails — absent
/// or malformed fields fall to their documented defaults.
#[must_use]
pub fn parse_response(response: &str) -> ParsedResponse {
    let mut decision = None;
    let mut confidence = None;
    let mut explanation = None;

    for line in response.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(rest) = lower.strip_prefix("decision:") {
            let value = trimmed[trimmed.len() - rest.len()..].trim();
            decision = Some(parse_decision(value));
        } else if let Some(rest) = lower.strip_prefix("confidence:") {
            let value = trimmed[trimmed.len() - rest.len()..].trim();
            confidence = value.parse::<f64>().ok();
        } else if let Some(rest) = lower.strip_prefix("explanation:") {
            let value = trimmed[trimmed.len() - rest.len()..].trim();
            explanation = Some(value.to_string());
        }
    }

    ParsedResponse {
        decision: decision.unwrap_or(Decision::Log),
        confidence: confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        explanation: explanation.unwrap_or_else(|| response.to_string()),
    }
}

fn parse_decision(value: &str) -> Decision {
    if let Some(d) = Decision::exact_match(value) {
        return d;
    }
    let upper = value.to_ascii_uppercase();
    for (needle, decision) in [
        ("BLOCK", Decision::Block),
        ("ALLOW", Decision::Allow),
        ("ALERT", Decision::Alert),
        ("ESCALATE", Decision::Escalate),
    ] {
        if upper.contains(needle) {
            return decision;
        }
    }
    Decision::Log
}

/// Scores an explanation's apparent reasoning quality. Pure, total, clamped
/// to [0, 1].
#[must_use]
pub fn score_explanation(explanation: &str) -> f64 {
    let word_count = explanation.split_whitespace().count();
    let lower = explanation.to_ascii_lowercase();

    let mut score = 0.0;
    if word_count >= 10 {
        score += 0.3;
    }
    if word_count >= 20 {
        score += 0.2;
    }

    let keyword_hits = REASONING_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
    score += (0.1 * keyword_hits as f64).min(0.3);

    if !JARGON_KEYWORDS.iter().any(|k| lower.contains(k)) {
        score += 0.2;
    }

    score.min(1.0)
}

/// Classifies `decision` against `is_threat` into the four mutually
/// exclusive TP/FP/TN/FN flags.
#[must_use]
pub fn classify(decision: Decision, is_threat: bool) -> (bool, bool, bool, bool) {
    let guardian_blocked = decision.guardian_blocked();
    let tp = is_threat && guardian_blocked;
    let fp = !is_threat && guardian_blocked;
    let tn = !is_threat && !guardian_blocked;
    let fn_ = is_threat && !guardian_blocked;
    (tp, fp, tn, fn_)
}

/// Runs one (guardian, scenario) round to completion, persisting the
/// resulting record. Storage failures are logged and do not propagate —
/// the record is still returned to the caller so a generation can continue
/// without persistence.
pub async fn run_round(
    guardian: &mut Guardian,
    scenario: &Scenario,
    session_id: &str,
    generation: u64,
    round: u64,
    store: &dyn RecordStore,
) -> RoundOutcome {
    let span = tracing::info_span!(
        "arena_round",
        session_id,
        guardian_id = guardian.prompt_id(),
        scenario_id = %scenario.id,
    );
    let _enter = span.enter();

    let prompt = build_evaluation_prompt(scenario);
    let parsed = match guardian.respond(prompt).await {
        Ok(text) => parse_response(&text),
        Err(err) => ParsedResponse {
            decision: Decision::Log,
            confidence: 0.5,
            explanation: format!("ERROR: {err}"),
        },
    };
    guardian.reset_conversation();

    let (true_positive, false_positive, true_negative, false_negative) =
        classify(parsed.decision, scenario.context.ground_truth.is_threat);

    let policy_result = oracles::evaluate_policies(
        parsed.decision,
        scenario,
        &scenario.context.active_policies,
    );
    let (_rule_violations, _decision_penalty) =
        oracles::validate_decision(parsed.decision, scenario);

    let explanation_quality = score_explanation(&parsed.explanation);
    let evidence_hash = InteractionRecord::compute_evidence_hash(
        session_id,
        guardian.prompt_id(),
        &scenario.id,
        parsed.decision,
        parsed.confidence,
    );

    let record = InteractionRecord {
        session_id: session_id.to_string(),
        guardian_id: guardian.prompt_id().to_string(),
        scenario_id: scenario.id.clone(),
        generation,
        round,
        scenario_type: scenario.context.scenario_type,
        profile_type: scenario.context.profile_type,
        platform: scenario.context.platform.clone(),
        difficulty: scenario.difficulty,
        decision: parsed.decision,
        confidence: parsed.confidence,
        explanation: parsed.explanation,
        true_positive,
        false_positive,
        true_negative,
        false_negative,
        explanation_quality,
        privacy_compliant: true,
        policy_compliant: policy_result.compliant,
        evidence_hash,
        timestamp: Utc::now(),
    };

    if let Err(err) = store.insert(&record).await {
        tracing::warn!(error = %err, "failed to persist interaction record; continuing without it");
    }

    RoundOutcome { record, policy_result }
}

/// Assembles a generation's scenario batch: synthetic scenarios from
/// `generator`, with up to 30% replaced by sampled `external` scenarios
/// when present, then shuffled.
pub fn assemble_session_batch(
    generator: &mut ScenarioGenerator,
    external: &[Scenario],
    count: usize,
    threat_ratio: f64,
    profile: dojo_shared::ProfileType,
) -> Vec<Scenario> {
    use rand::seq::SliceRandom;

    let mut batch = generator.generate_batch(count, threat_ratio, profile);

    if !external.is_empty() {
        let external_slots = ((count as f64) * 0.3).floor() as usize;
        let external_slots = external_slots.min(external.len()).min(batch.len());
        let mut sampled: Vec<Scenario> = external.to_vec();
        sampled.shuffle(generator.rng_mut());
        sampled.truncate(external_slots);

        for (i, scenario) in sampled.into_iter().enumerate() {
            batch[i] = scenario;
        }
    }

    batch.shuffle(generator.rng_mut());
    batch
}
