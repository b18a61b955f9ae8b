use crate::demo::{run_demo, run_recap, run_risk, DemoArgs, RecapArgs, RiskArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tuition_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tuition Ledger",
    about = "Allocate school fee payments and score collection risk from the command line",
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
    /// Build a financial recap from a fee schedule and a payment ledger export
    Recap(RecapArgs),
    /// Score raw collection signals without a ledger
    Risk(RiskArgs),
    /// Print dossiers for the bundled sample students
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
        Command::Recap(args) => run_recap(args),
        Command::Risk(args) => run_risk(args),
        Command::Demo(args) => run_demo(args),
    }
}
