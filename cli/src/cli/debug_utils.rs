use super::argparse::{AppConfig, DebugCommand};

impl DebugCommand {
    pub(crate) async fn run(&self, app_config: &AppConfig) -> anyhow::Result<()> {
        match self {
            DebugCommand::ShowConfig => show_config(app_config),
        }
    }
}

fn show_config(app_config: &AppConfig) -> anyhow::Result<()> {
    let app = app_config.build()?;
    println!("{:#?}", app);
    Ok(())
}
