use anyhow::Context;
use std::env;
use std::path::PathBuf;

/// Process-wide configuration, loaded once at startup from the environment:
/// parse-with-context, explicit range validation, `tracing::warn!` on
/// suspicious-but-not-fatal values.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub model_name: String,
    pub db_path: PathBuf,
    pub lineage_path: PathBuf,
    pub external_scenarios_dir: Option<PathBuf>,
    pub population_size: usize,
    pub elite_fraction: f64,
    pub min_generations: u64,
    pub backend_timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let backend_url = env::var("DOJO_BACKEND_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:11434/v1/chat/completions".to_string());

        let model_name =
            env::var("DOJO_MODEL_NAME").unwrap_or_else(|_| "llama3".to_string());

        let db_path = env::var("DOJO_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/guardian_dojo.db"));

        let lineage_path = env::var("DOJO_LINEAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/guardian_lineage.json"));

        let external_scenarios_dir = env::var("DOJO_EXTERNAL_SCENARIOS_DIR").ok().map(PathBuf::from);

        let population_size = env::var("DOJO_POPULATION_SIZE")
            .unwrap_or_else(|_| "12".to_string())
            .parse::<usize>()
            .context("Failed to parse DOJO_POPULATION_SIZE")?;

        if population_size == 0 || population_size > 500 {
            anyhow::bail!(
                "DOJO_POPULATION_SIZE must be between 1 and 500 (got {})",
                population_size
            );
        }

        let elite_fraction = env::var("DOJO_ELITE_FRACTION")
            .unwrap_or_else(|_| "0.25".to_string())
            .parse::<f64>()
            .context("Failed to parse DOJO_ELITE_FRACTION")?;

        if !elite_fraction.is_finite() || !(0.0..=1.0).contains(&elite_fraction) {
            anyhow::bail!(
                "DOJO_ELITE_FRACTION must be in [0.0, 1.0] (got {})",
                elite_fraction
            );
        }

        let min_generations = env::var("DOJO_MIN_GENERATIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .context("Failed to parse DOJO_MIN_GENERATIONS")?;

        if min_generations == 0 {
            tracing::warn!("DOJO_MIN_GENERATIONS is 0; prompts may graduate after one generation");
        }

        let backend_timeout_secs = env::var("DOJO_BACKEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("Failed to parse DOJO_BACKEND_TIMEOUT_SECS")?;

        if backend_timeout_secs == 0 || backend_timeout_secs > 300 {
            anyhow::bail!(
                "DOJO_BACKEND_TIMEOUT_SECS must be between 1 and 300 (got {})",
                backend_timeout_secs
            );
        }

        Ok(Self {
            backend_url,
            model_name,
            db_path,
            lineage_path,
            external_scenarios_dir,
            population_size,
            elite_fraction,
            min_generations,
            backend_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvGuard(&'static str);
    impl Drop for EnvGuard {
        fn drop(&mut self) {
            std::env::remove_var(self.0);
        }
    }

    #[test]
    fn default_population_size() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvGuard("DOJO_POPULATION_SIZE");
        std::env::remove_var("DOJO_POPULATION_SIZE");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.population_size, 12);
    }

    #[test]
    fn rejects_out_of_range_elite_fraction() {
        let _lock = ENV_LOCK.lock().unwrap();
        std::env::set_var("DOJO_ELITE_FRACTION", "1.5");
        let _guard = EnvGuard("DOJO_ELITE_FRACTION");
        assert!(AppConfig::load().is_err());
    }
}
