use crate::demo::{run_demo, run_fetch, run_timeline, DemoArgs, FetchArgs, TimelineArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use probate_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Probate Advancement Portal",
    about = "Inspect probate advancement applications and serve their stage timelines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Derive the stage timeline for an application snapshot stored on disk
    Timeline(TimelineArgs),
    /// Fetch an application from the portal backend and print its timeline
    Fetch(FetchArgs),
    /// Walk a sample application through every stage of the workflow
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Timeline(args) => run_timeline(args),
        Command::Fetch(args) => run_fetch(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
