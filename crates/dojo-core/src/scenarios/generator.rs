//! Threat and benign scenario generation.

use chrono::Utc;
use dojo_shared::{
    Difficulty, GroundTruth, ProfileType, Scenario, ScenarioContext, ScenarioType, SenderProfile,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::patterns;

/// Produces labelled scenarios at controllable difficulty. Accepts an
/// optional seed so scenario batches are reproducible in tests.
pub struct ScenarioGenerator {
    rng: StdRng,
}

impl ScenarioGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn new_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Exposes the underlying RNG so callers (e.g. the arena's batch
    /// assembler) can shuffle external scenarios with the same stream.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn render_easy(&mut self, fragments: &[&str]) -> (String, Vec<String>) {
        let mut chosen: Vec<&str> = fragments.to_vec();
        chosen.shuffle(&mut self.rng);
        let chosen: Vec<&str> = chosen.into_iter().take(3).collect();
        let text = chosen.join(". ");
        (text, chosen.into_iter().map(str::to_string).collect())
    }

    fn render_medium(&mut self, t: ScenarioType, fragments: &[&str]) -> (String, Vec<String>) {
        let mut chosen: Vec<&str> = fragments.to_vec();
        chosen.shuffle(&mut self.rng);
        let chosen: Vec<&str> = chosen.into_iter().take(2).collect();
        let carriers = patterns::CONVERSATIONAL_CARRIERS;
        let wrapped: Vec<String> = chosen
            .iter()
            .map(|p| {
                let carrier = carriers.choose(&mut self.rng).unwrap_or(&"{p}");
                carrier.replace("{p}", p)
            })
            .collect();
        let mut text = patterns::opener(t).to_string();
        for w in &wrapped {
            text.push(' ');
            text.push_str(w);
        }
        (text, chosen.into_iter().map(str::to_string).collect())
    }

    fn render_hard(&mut self, fragments: &[&str]) -> (String, Vec<String>) {
        let mut chosen: Vec<&str> = fragments.to_vec();
        chosen.shuffle(&mut self.rng);
        let chosen: Vec<&str> = chosen.into_iter().take(2).collect();
        let fillers = patterns::FILLER_TOKENS;
        let paraphrased: Vec<String> = chosen
            .iter()
            .map(|p| {
                let filler = fillers.choose(&mut self.rng).unwrap_or(&"you know");
                interpolate_midpoint(p, filler)
            })
            .collect();
        (paraphrased.join(" "), chosen.into_iter().map(str::to_string).collect())
    }

    fn synthesize_sender(&mut self, t: ScenarioType, difficulty: Difficulty) -> SenderProfile {
        let names = patterns::name_pool(t);
        let display_name = (*names.choose(&mut self.rng).unwrap_or(&"Unknown")).to_string();
        let risk_indicators: Vec<String> = patterns::risk_indicators(t)
            .iter()
            .map(|s| (*s).to_string())
            .collect();

        let (account_age, mutual_connections, is_verified) = match difficulty {
            Difficulty::Easy => {
                let days = self.rng.gen_range(1..=7);
                (format_age(days, "day"), 0, false)
            }
            Difficulty::Medium => {
                let months = self.rng.gen_range(1..=6);
                let mutuals = self.rng.gen_range(0..=3);
                (format_age(months, "month"), mutuals, false)
            }
            Difficulty::Hard => {
                let years = self.rng.gen_range(1..=3);
                let mutuals = self.rng.gen_range(5..=20);
                let verified = self.rng.gen_bool(0.3);
                (format_age(years, "year"), mutuals, verified)
            }
        };

        SenderProfile {
            display_name,
            account_age,
            mutual_connections,
            is_verified,
            risk_indicators,
        }
    }

    /// Builds a single threat scenario.
    pub fn generate_threat(
        &mut self,
        scenario_type: ScenarioType,
        profile: ProfileType,
        difficulty: Difficulty,
    ) -> Scenario {
        let fragments = patterns::threat_fragments(scenario_type);
        let (threat_content, patterns_used) = match difficulty {
            Difficulty::Easy => self.render_easy(fragments),
            Difficulty::Medium => self.render_medium(scenario_type, fragments),
            Difficulty::Hard => self.render_hard(fragments),
        };

        let sender_info = self.synthesize_sender(scenario_type, difficulty);
        let platform = (*patterns::platforms().choose(&mut self.rng).unwrap_or(&"Messenger"))
            .to_string();

        let ground_truth = GroundTruth {
            is_threat: true,
            correct_decision: scenario_type.correct_decision(),
            threat_category: Some(scenario_type),
            severity: scenario_type.severity(),
            patterns: patterns_used,
        };

        Scenario {
            id: self.new_id(),
            context: ScenarioContext {
                scenario_type,
                profile_type: profile,
                platform,
                threat_content,
                sender_info,
                ground_truth,
                active_policies: vec![],
            },
            conversation_history: vec![],
            difficulty,
        }
    }

    /// Builds a single benign scenario.
    pub fn generate_benign(&mut self, profile: ProfileType) -> Scenario {
        let templates = patterns::benign_templates(profile);
        let threat_content = (*templates.choose(&mut self.rng).unwrap_or(&"Hello!")).to_string();
        let years = self.rng.gen_range(1..=5);
        let mutual_connections = self.rng.gen_range(5..=50);
        let platform = (*patterns::platforms().choose(&mut self.rng).unwrap_or(&"Messenger"))
            .to_string();

        Scenario {
            id: self.new_id(),
            context: ScenarioContext {
                scenario_type: ScenarioType::SocialEngineering, // placeholder, never read for benign
                profile_type: profile,
                platform,
                threat_content,
                sender_info: SenderProfile {
                    display_name: "Known Contact".to_string(),
                    account_age: format_age(years, "year"),
                    mutual_connections,
                    is_verified: true,
                    risk_indicators: vec![],
                },
                ground_truth: GroundTruth {
                    is_threat: false,
                    correct_decision: dojo_shared::Decision::Allow,
                    threat_category: None,
                    severity: 0.0,
                    patterns: vec![],
                },
                active_policies: vec![],
            },
            conversation_history: vec![],
            difficulty: Difficulty::Easy,
        }
    }

    /// Given `count` and `threat_ratio` ∈ [0,1], emits `floor(count*ratio)`
    /// threats round-robin over all 15 types and 3 difficulties, plus the
    /// remainder as benigns, shuffled before return.
    pub fn generate_batch(&mut self, count: usize, threat_ratio: f64, profile: ProfileType) -> Vec<Scenario> {
        let threat_count = ((count as f64) * threat_ratio).floor() as usize;
        let benign_count = count - threat_count;

        let difficulties = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
        let mut batch = Vec::with_capacity(count);

        for i in 0..threat_count {
            let scenario_type = ScenarioType::ALL[i % ScenarioType::ALL.len()];
            let difficulty = difficulties[i % difficulties.len()];
            batch.push(self.generate_threat(scenario_type, profile, difficulty));
        }

        for _ in 0..benign_count {
            batch.push(self.generate_benign(profile));
        }

        batch.shuffle(&mut self.rng);
        batch
    }
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn format_age(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Interpolates a filler token at the midpoint word boundary of `text`.
fn interpolate_midpoint(text: &str, filler: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return text.to_string();
    }
    let mid = words.len() / 2;
    let mut out: Vec<&str> = Vec::with_capacity(words.len() + 1);
    out.extend_from_slice(&words[..mid]);
    out.push(filler);
    out.extend_from_slice(&words[mid..]);
    out.join(" ")
}
