use std::sync::Arc;
use std::time::Duration;

use dojo_core::{AppConfig, EvolutionConfig, EvolutionController, HttpChatBackend};

use crate::commands::parse_profile;
use crate::output;
use crate::storage::open_store;

pub async fn run(generations: u64, profile: &str, json: bool) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let profile = parse_profile(profile)?;

    let backend = Arc::new(HttpChatBackend::new(
        config.backend_url.clone(),
        config.model_name.clone(),
        Duration::from_secs(config.backend_timeout_secs),
    ));
    let store = open_store(&config).await?;
    let external = config
        .external_scenarios_dir
        .as_ref()
        .map(|dir| dojo_core::load_external_scenarios(dir))
        .unwrap_or_default();

    let evolution_config = EvolutionConfig {
        population_size: config.population_size,
        elite_fraction: config.elite_fraction,
        min_generations: config.min_generations,
        ..EvolutionConfig::default()
    };

    let mut controller = EvolutionController::new(
        evolution_config,
        backend,
        store,
        config.lineage_path.clone(),
        external,
        profile,
    )
    .await?;

    if !json {
        output::print_header("Guardian Dojo — Evolution Run");
    }

    for _ in 0..generations {
        let summary = controller.run_generation().await?;
        if json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            output::print_generation_result(
                summary.generation,
                summary.best_fitness,
                summary.avg_fitness,
                summary.best_detection_rate,
                summary.best_false_positive_rate,
            );
        }
    }

    Ok(())
}
