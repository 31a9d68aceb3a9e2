use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dojo_core::{arena, AppConfig, FitnessWeights, Guardian, HttpChatBackend, ScenarioGenerator};

use crate::commands::parse_profile;
use crate::output;
use crate::storage::open_store;

pub async fn run(
    prompt_file: Option<String>,
    count: usize,
    threat_ratio: f64,
    profile: &str,
    json: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let profile = parse_profile(profile)?;

    let prompt_text = match prompt_file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read prompt file {path}"))?,
        None => dojo_core::evolution::seed_prompts(1)
            .into_iter()
            .next()
            .expect("seed_prompts(1) always yields one entry")
            .text,
    };

    let backend = Arc::new(HttpChatBackend::new(
        config.backend_url.clone(),
        config.model_name.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    ));
    let store = open_store(&config).await?;
    let mut guardian = Guardian::new("cli-arena", prompt_text, backend);

    let mut generator = ScenarioGenerator::new();
    let external = config
        .external_scenarios_dir
        .as_ref()
        .map(|dir| dojo_core::load_external_scenarios(dir))
        .unwrap_or_default();
    let batch = arena::assemble_session_batch(&mut generator, &external, count, threat_ratio, profile);

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut records = Vec::with_capacity(batch.len());
    for (round, scenario) in batch.iter().enumerate() {
        let outcome = arena::run_round(&mut guardian, scenario, &session_id, 0, round as u64, store.as_ref()).await;
        records.push(outcome.record);
    }

    let report = dojo_core::fitness::evaluate(&records, &FitnessWeights::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "sessionId": session_id,
            "scenariosRun": records.len(),
            "detectionRate": report.detection_rate,
            "falsePositiveRate": report.false_positive_rate,
            "f1": report.f1,
            "explanationScore": report.explanation_score,
            "totalFitness": report.total_fitness,
        }))?);
    } else {
        output::print_header("Arena Session");
        println!("  session:        {session_id}");
        println!("  scenarios run:  {}", records.len());
        println!("  detection rate: {:.2}", report.detection_rate);
        println!("  false positive: {:.2}", report.false_positive_rate);
        println!("  f1:             {:.2}", report.f1);
        println!("  total fitness:  {:.3}", report.total_fitness);
    }

    Ok(())
}
