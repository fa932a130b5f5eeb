use anyhow::Context;
use app::app::{CatalogKind, EnrichmentKind};
use gamedex_core::EnrichedRecord;

use super::argparse::{AppConfig, SearchCommand};

impl SearchCommand {
    pub(crate) async fn run(&self, app_config: &AppConfig) -> anyhow::Result<()> {
        let (catalog, enrichment) = if self.mock {
            (Some(CatalogKind::Mock), Some(EnrichmentKind::Mock))
        } else {
            (None, None)
        };
        let app = app_config
            .builder()?
            .update(|c| c.catalog(catalog)?.enrichment(enrichment))?
            .build()
            .context("could not build app config")?;
        log::trace!("using app: {:?}", app);

        let query = self.query.join(" ");
        let records = app
            .search_service()
            .organize(&query)
            .await
            .with_context(|| format!("search for {:?} failed", query))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        Ok(())
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn format_record(record: &EnrichedRecord) -> String {
    let score = record
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "--".to_owned());
    let mut out = format!(
        "[{:>3}] {} ({})",
        score,
        record.title,
        or_dash(record.release_year.as_deref())
    );
    if !record.genres.is_empty() {
        out.push_str(&format!(" [{}]", record.genres.join(", ")));
    }
    out.push_str(&format!(
        "\n      main: {}  completionist: {}",
        or_dash(record.playtime_main.as_deref()),
        or_dash(record.playtime_completionist.as_deref())
    ));
    if let Some(desc) = record
        .details
        .as_ref()
        .and_then(|d| d.short_description.as_deref())
    {
        out.push_str(&format!("\n      {}", desc));
    }
    if let Some(url) = record.store_url.as_deref() {
        out.push_str(&format!("\n      {}", url));
    }
    out
}
