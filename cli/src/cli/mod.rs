pub mod argparse;
mod debug_utils;
mod helpers;
mod lookup;
mod search;

pub use argparse::get_args;

impl argparse::CliOpts {
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.subcmd {
            argparse::SubCommand::Search(cmd) => cmd.run(&self.app_config).await,
            argparse::SubCommand::Playtime(cmd) => cmd.run(&self.app_config).await,
            argparse::SubCommand::Details(cmd) => cmd.run(&self.app_config).await,
            argparse::SubCommand::Debug(cmd) => cmd.run(&self.app_config).await,
        }
    }
}
