use crate::score::{run_list_plugins, run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lkps_scoring::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "LKPS Scoring Engine",
    about = "Score LKPS accreditation tables from the command line or over HTTP",
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
    /// Import table spreadsheets in order, save them, and print their scores
    Score(ScoreArgs),
    /// List the table codes that have a scoring plugin
    Plugins,
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
        Command::Score(args) => run_score(args),
        Command::Plugins => {
            run_list_plugins();
            Ok(())
        }
    }
}
