use dojo_core::{AppConfig, LineagePersistence};

use crate::output;

pub async fn run(json: bool) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let lineage = LineagePersistence::new(config.lineage_path.clone()).load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lineage.graduated)?);
    } else {
        output::print_graduated_table(&lineage.graduated);
    }

    Ok(())
}
