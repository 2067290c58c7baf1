use crate::demo::{run_demo, run_report, run_score, DemoArgs, ReportArgs, ScoreArgs};
use crate::server;
use appraisal::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "appraisal-api",
    about = "Score, submit and approve employee performance evaluations",
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
    /// Walk two sample evaluations through the wizard, submission and approval
    Demo(DemoArgs),
    /// Score a draft evaluation JSON file and show which wizard steps are incomplete
    Score(ScoreArgs),
    /// Build the quarterly summary from exported evaluation records
    Report(ReportArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Score(args) => run_score(args),
        Command::Report(args) => run_report(args),
    }
}
