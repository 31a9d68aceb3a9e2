//! Meta-prompted rewriting of a parent prompt (or crossover of two) under
//! a chosen mutation type.

use dojo_shared::{ChatBackend, ChatMessage, DojoError, DojoResult};
use rand::Rng;

const MAX_WORDS: usize = 500;
const MIN_CLEANED_LEN: usize = 50;

const META_SYSTEM_PROMPT: &str = "You are rewriting a Guardian AI's system prompt. \
The rewritten prompt must stay under 500 words, must retain the DECISION/CONFIDENCE/EXPLANATION \
response format, must not reference any cloud service, and must preserve the parent's final \
authority over the protected user. Respond with only the rewritten prompt text.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationType {
    SensitivityTuning,
    SpecializationShift,
    ExplanationImprovement,
    PolicyAdherence,
    FalsePositiveReduction,
    Crossover,
}

impl MutationType {
    const NON_CROSSOVER: [MutationType; 5] = [
        MutationType::SensitivityTuning,
        MutationType::SpecializationShift,
        MutationType::ExplanationImprovement,
        MutationType::PolicyAdherence,
        MutationType::FalsePositiveReduction,
    ];

    /// Uniform pick among the five non-crossover mutation types.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::NON_CROSSOVER[rng.gen_range(0..Self::NON_CROSSOVER.len())]
    }

    /// Returns `Crossover` with probability 0.2 when at least two elites
    /// exist, otherwise falls back to [`Self::random`].
    #[must_use]
    pub fn select<R: Rng + ?Sized>(rng: &mut R, elite_count: usize) -> Self {
        if elite_count >= 2 && rng.gen_bool(0.2) {
            Self::Crossover
        } else {
            Self::random(rng)
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::SensitivityTuning => {
                "Adjust the prompt's sensitivity to threat signals to improve detection without \
                 increasing false alarms."
            }
            Self::SpecializationShift => {
                "Shift the prompt's focus toward a different dominant threat category than its \
                 current specialization."
            }
            Self::ExplanationImprovement => {
                "Instruct the Guardian to give longer, more concrete, reasoning-rich explanations \
                 for its decisions."
            }
            Self::PolicyAdherence => {
                "Strengthen the prompt's adherence to active policy rules such as blocking \
                 unverified strangers or unauthorized spending."
            }
            Self::FalsePositiveReduction => {
                "Reduce the prompt's tendency to block or escalate benign content, especially for \
                 child profiles."
            }
            Self::Crossover => {
                "Combine the two parent prompts into a single prompt inheriting the stronger \
                 traits of each."
            }
        }
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SensitivityTuning => "sensitivityTuning",
            Self::SpecializationShift => "specializationShift",
            Self::ExplanationImprovement => "explanationImprovement",
            Self::PolicyAdherence => "policyAdherence",
            Self::FalsePositiveReduction => "falsePositiveReduction",
            Self::Crossover => "crossover",
        };
        write!(f, "{s}")
    }
}

/// Rewrites `parent_text` under `mutation_type`, given `feedback` describing
/// how the parent performed in evaluation.
pub async fn mutate(
    backend: &dyn ChatBackend,
    parent_text: &str,
    mutation_type: MutationType,
    feedback: &str,
) -> DojoResult<String> {
    let user_message = format!(
        "{}\n\nParent prompt:\n{parent_text}\n\nEvaluation feedback:\n{feedback}",
        mutation_type.instruction()
    );
    let messages = [
        ChatMessage::system(META_SYSTEM_PROMPT),
        ChatMessage::user(user_message),
    ];
    let raw = backend.chat(&messages).await?;
    clean_output(&raw)
}

/// Combines two elite parents into one descendant.
pub async fn crossover(
    backend: &dyn ChatBackend,
    parent_a: &str,
    parent_b: &str,
    feedback: &str,
) -> DojoResult<String> {
    let user_message = format!(
        "{}\n\nParent A:\n{parent_a}\n\nParent B:\n{parent_b}\n\nEvaluation feedback:\n{feedback}",
        MutationType::Crossover.instruction()
    );
    let messages = [
        ChatMessage::system(META_SYSTEM_PROMPT),
        ChatMessage::user(user_message),
    ];
    let raw = backend.chat(&messages).await?;
    clean_output(&raw)
}

/// Strips surrounding whitespace and an optional fenced-code wrapper,
/// truncates to 500 words, and rejects results shorter than 50 characters.
fn clean_output(raw: &str) -> DojoResult<String> {
    let trimmed = raw.trim();
    let unfenced = strip_code_fence(trimmed);
    let truncated = truncate_words(unfenced, MAX_WORDS);
    let cleaned = truncated.trim().to_string();

    if cleaned.len() < MIN_CLEANED_LEN {
        return Err(DojoError::MutatorInvalidOutput(format!(
            "cleaned output is only {} characters, minimum is {MIN_CLEANED_LEN}",
            cleaned.len()
        )));
    }
    Ok(cleaned)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix("```") else {
        return text;
    };
    let after_open = after_open
        .find('\n')
        .map_or(after_open, |idx| &after_open[idx + 1..]);
    after_open.strip_suffix("```").unwrap_or(after_open).trim()
}

fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        words[..max_words].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct StaticBackend(String);

    #[async_trait]
    impl ChatBackend for StaticBackend {
        async fn chat(&self, _messages: &[ChatMessage]) -> DojoResult<String> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn random_never_returns_crossover() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_ne!(MutationType::random(&mut rng), MutationType::Crossover);
        }
    }

    #[test]
    fn select_mutation_with_one_elite_never_crosses_over() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert_ne!(MutationType::select(&mut rng, 1), MutationType::Crossover);
        }
    }

    #[test]
    fn select_mutation_with_two_elites_sometimes_crosses_over() {
        let mut rng = StdRng::seed_from_u64(11);
        let saw_crossover = (0..500).any(|_| MutationType::select(&mut rng, 2) == MutationType::Crossover);
        assert!(saw_crossover);
    }

    #[test]
    fn strip_code_fence_removes_fenced_wrapper() {
        let fenced = "```\nYou are a Guardian AI that protects children from online threats with great care.\n```";
        let cleaned = strip_code_fence(fenced);
        assert!(!cleaned.contains("```"));
        assert!(cleaned.starts_with("You are a Guardian"));
    }

    #[test]
    fn truncate_words_caps_at_500() {
        let long = vec!["word"; 600].join(" ");
        let truncated = truncate_words(&long, 500);
        assert_eq!(truncated.split_whitespace().count(), 500);
    }

    #[tokio::test]
    async fn mutate_rejects_output_shorter_than_fifty_characters() {
        let backend = StaticBackend("too short".to_string());
        let result = mutate(&backend, "parent", MutationType::SensitivityTuning, "feedback").await;
        assert!(matches!(result, Err(DojoError::MutatorInvalidOutput(_))));
    }

    #[tokio::test]
    async fn mutate_accepts_well_formed_output() {
        let text = "You are a Guardian AI protecting a child from online grooming threats. \
                     Always explain your reasoning and err toward blocking unverified strangers.";
        let backend = StaticBackend(text.to_string());
        let result = mutate(&backend, "parent", MutationType::SensitivityTuning, "feedback")
            .await
            .unwrap();
        assert_eq!(result, text);
    }

    #[tokio::test]
    async fn crossover_cleans_output_same_as_mutate() {
        let text = "```\nA merged Guardian AI prompt combining strengths of both parents to \
                     better protect seniors from romance scams and phishing attempts.\n```";
        let backend = StaticBackend(text.to_string());
        let result = crossover(&backend, "parent a", "parent b", "feedback").await.unwrap();
        assert!(!result.contains("```"));
    }
}
