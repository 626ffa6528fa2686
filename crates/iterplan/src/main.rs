use crate::prelude::*;
use clap::Parser;

mod iterations;
mod planner;
mod prelude;
mod render;
mod workitems;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Queries a planner backend for iterations and work items and shows statistics"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Space (id) to work with
    #[clap(long, env = "PLANNER_SPACE", global = true, default_value = planner::DEFAULT_SPACE)]
    space: String,

    /// Filter any query by work item type name(s) or id(s)
    #[clap(long, global = true, value_delimiter = ',')]
    include_item_types: Vec<String>,

    /// Base URL of the planner API
    #[clap(long, global = true)]
    api_url: Option<String>,

    /// Maximum number of work items fetched per search (first page only)
    #[clap(long, global = true)]
    page_limit: Option<usize>,

    /// Whether to display additional information.
    #[clap(long, env = "PLANNER_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Queries iterations in the selected space and shows high level statistics
    Iterations(iterations::Options),

    /// Queries work items in a particular iteration and shows related statistics
    WorkItems(workitems::Options),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Iterations(options) => iterations::run(options, app.global).await,
        SubCommands::WorkItems(options) => workitems::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
