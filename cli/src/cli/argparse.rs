use std::path::PathBuf;

use clap::Parser;
use gamedex_core::SteamAppId;

pub fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Parser, Debug)]
#[clap(version = clap::crate_version!(), about = "Search games and enrich them with store details and playtimes")]
pub struct CliOpts {
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(flatten)]
    pub app_config: AppConfig,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Search the catalog and rank enriched results
    Search(SearchCommand),

    /// Look up playtime estimates for a single title
    Playtime(PlaytimeCommand),

    /// Fetch store details for a Steam app id
    Details(DetailsCommand),

    /// Debugging Utilities
    #[clap(subcommand)]
    Debug(DebugCommand),
}

#[derive(Parser, Debug)]
pub struct AppConfig {
    /// Path to a gamedex.toml config file.
    ///
    /// If not provided, the user config dir is checked.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SearchCommand {
    /// The search query
    #[clap(required = true)]
    pub query: Vec<String>,

    /// Print records as JSON
    #[clap(long)]
    pub json: bool,

    /// Use the built-in mock catalog and canned enrichment, no network needed
    #[clap(long)]
    pub mock: bool,
}

#[derive(Parser, Debug)]
pub struct PlaytimeCommand {
    /// The game title
    #[clap(required = true)]
    pub title: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct DetailsCommand {
    /// Steam app id, e.g. 292030
    pub app_id: SteamAppId,
}

#[derive(Parser, Debug)]
pub enum DebugCommand {
    /// Show the resolved configuration for the given settings.
    ShowConfig,
}
