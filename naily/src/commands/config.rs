//! `naily config` — print the resolved settings.

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Emit JSON instead of plain text.
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let config = naily::config().context("failed to load config")?;
        let source = config.source().map(|path| path.display().to_string());

        if self.json {
            let payload = serde_json::json!({
                "source": source,
                "keys": config.keys(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to render config JSON")?
            );
            return Ok(());
        }

        println!("source: {}", source.as_deref().unwrap_or("(defaults)"));
        for key in config.keys() {
            println!("  {key}");
        }
        Ok(())
    }
}
