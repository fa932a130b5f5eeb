use anyhow::Context;
use app::app::{GamedexApp, GamedexBuilder};

use super::argparse::AppConfig;

impl AppConfig {
    pub(crate) fn builder(&self) -> anyhow::Result<GamedexBuilder> {
        GamedexBuilder::new()
            .context("could not create app builder")?
            .update(|c| c.config_file(self.config.as_deref()))
            .context("could not set config file")
    }

    pub(crate) fn build(&self) -> anyhow::Result<GamedexApp> {
        self.builder()?
            .build()
            .context("could not build app config")
    }
}
