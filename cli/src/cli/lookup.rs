use anyhow::Context;
use enrichment::{DetailsSource, PlaytimeSource};

use super::argparse::{AppConfig, DetailsCommand, PlaytimeCommand};

impl PlaytimeCommand {
    pub(crate) async fn run(&self, app_config: &AppConfig) -> anyhow::Result<()> {
        let app = app_config.build()?;
        let title = self.title.join(" ");
        match app.playtime().lookup(&title).await {
            Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
            None => println!("no playtime found for {:?}", title),
        }
        Ok(())
    }
}

impl DetailsCommand {
    pub(crate) async fn run(&self, app_config: &AppConfig) -> anyhow::Result<()> {
        let app = app_config.build()?;
        let details = app
            .details()
            .fetch(self.app_id)
            .await
            .with_context(|| format!("could not fetch details for app {}", self.app_id))?;
        match details {
            Some(d) => println!("{}", serde_json::to_string_pretty(&d)?),
            None => println!("no store details for app {}", self.app_id),
        }
        Ok(())
    }
}
