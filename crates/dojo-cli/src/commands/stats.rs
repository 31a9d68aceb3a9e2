use dojo_core::AppConfig;
use dojo_shared::Decision;

use crate::output;
use crate::storage::open_store;

const ALL_DECISIONS: [Decision; 5] = [
    Decision::Block,
    Decision::Allow,
    Decision::Alert,
    Decision::Log,
    Decision::Escalate,
];

pub async fn run(json: bool) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let store = open_store(&config).await?;

    let total = store.total_count().await?;
    let mut by_decision = Vec::with_capacity(ALL_DECISIONS.len());
    for decision in ALL_DECISIONS {
        let count = store.count_by_decision(decision).await?;
        by_decision.push((decision, count));
    }

    if json {
        let decisions: serde_json::Map<String, serde_json::Value> = by_decision
            .iter()
            .map(|(d, c)| (d.to_string(), serde_json::json!(c)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "total": total,
                "byDecision": decisions,
            }))?
        );
    } else {
        output::print_record_summary(total, &by_decision);
    }

    Ok(())
}
