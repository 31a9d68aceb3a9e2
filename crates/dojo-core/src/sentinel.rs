//! Detects loss of strategic diversity in the population and issues
//! penalties and sub-lineage directives.
//!
//! The exact dominance thresholds and penalty function aren't pinned to one
//! correct value, so they are exposed here as tunable [`SentinelConfig`]
//! fields rather than hard-coded constants.

use std::collections::HashMap;

use dojo_shared::Specialization;

#[derive(Debug, Clone, PartialEq)]
pub struct SentinelConfig {
    /// Share of the candidate pool at or above which a specialization
    /// counts as dominant.
    pub dominant_threshold: f64,
    /// Share of the elite set at or above which a specialization counts
    /// as having captured the elites.
    pub elite_captured_threshold: f64,
    /// Lower bound on the multiplicative fitness penalty — a dominant
    /// strategy is never penalized below this factor.
    pub penalty_floor: f64,
    /// Fresh non-dominant seed prompts injected per detected monoculture
    /// event.
    pub sub_lineage_per_event: usize,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            dominant_threshold: 0.5,
            elite_captured_threshold: 0.75,
            penalty_floor: 0.5,
            sub_lineage_per_event: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentinelVerdict {
    pub dominant_strategies: Vec<(Specialization, f64)>,
    pub elite_captured: Vec<(Specialization, f64)>,
    pub is_monoculture: bool,
    pub fitness_penalty_map: HashMap<Specialization, f64>,
    pub mutation_rate_multiplier: f64,
    pub sub_lineage_count: usize,
    pub event_log: Vec<String>,
}

fn shares(histogram: &HashMap<Specialization, usize>, total: usize) -> Vec<(Specialization, f64)> {
    if total == 0 {
        return Vec::new();
    }
    histogram
        .iter()
        .map(|(spec, count)| (*spec, *count as f64 / total as f64))
        .collect()
}

/// Inspects a generation's specialization distribution before and after
/// elite selection.
#[must_use]
pub fn evaluate(
    candidate_histogram: &HashMap<Specialization, usize>,
    population_size: usize,
    elite_histogram: &HashMap<Specialization, usize>,
    elite_count: usize,
    config: &SentinelConfig,
) -> SentinelVerdict {
    let candidate_shares = shares(candidate_histogram, population_size);
    let elite_shares = shares(elite_histogram, elite_count);

    let dominant_strategies: Vec<(Specialization, f64)> = candidate_shares
        .iter()
        .copied()
        .filter(|(_, share)| *share >= config.dominant_threshold)
        .collect();

    let elite_captured: Vec<(Specialization, f64)> = elite_shares
        .iter()
        .copied()
        .filter(|(_, share)| *share >= config.elite_captured_threshold)
        .collect();

    let is_monoculture = !dominant_strategies.is_empty() || !elite_captured.is_empty();

    let mut fitness_penalty_map = HashMap::new();
    for (spec, share) in &dominant_strategies {
        let excess = (share - config.dominant_threshold).max(0.0);
        let factor = (1.0 - excess).max(config.penalty_floor);
        fitness_penalty_map.insert(*spec, factor);
    }

    let max_excess = dominant_strategies
        .iter()
        .map(|(_, share)| (share - config.dominant_threshold).max(0.0))
        .fold(0.0_f64, f64::max);
    let mutation_rate_multiplier = if is_monoculture { 1.0 + max_excess } else { 1.0 };

    let sub_lineage_count = if is_monoculture {
        config.sub_lineage_per_event
    } else {
        0
    };

    let mut event_log = Vec::new();
    for (spec, share) in &dominant_strategies {
        event_log.push(format!(
            "dominant strategy {spec} at {:.0}% of candidate pool",
            share * 100.0
        ));
    }
    for (spec, share) in &elite_captured {
        event_log.push(format!(
            "elite capture by {spec} at {:.0}% of elites",
            share * 100.0
        ));
    }

    SentinelVerdict {
        dominant_strategies,
        elite_captured,
        is_monoculture,
        fitness_penalty_map,
        mutation_rate_multiplier,
        sub_lineage_count,
        event_log,
    }
}
