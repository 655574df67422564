use crate::demo::{
    run_demo, run_estimate, run_ifta_report, run_rates, DemoArgs, EstimateArgs, RatesArgs,
    ReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_ifta::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet IFTA",
    about = "Compute IFTA quarterly fuel-tax reports from the command line or over HTTP",
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
    /// Fuel-tax reporting tools
    Ifta {
        #[command(subcommand)]
        command: IftaCommand,
    },
    /// Run the sample fleet quarter end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum IftaCommand {
    /// Build the quarterly apportionment report from a trip CSV export
    Report(ReportArgs),
    /// Quick, non-apportioned estimate for one jurisdiction
    Estimate(EstimateArgs),
    /// Show the configured per-gallon rates
    Rates(RatesArgs),
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
        Command::Ifta { command } => match command {
            IftaCommand::Report(args) => run_ifta_report(args),
            IftaCommand::Estimate(args) => run_estimate(args),
            IftaCommand::Rates(args) => run_rates(args),
        },
        Command::Demo(args) => run_demo(args),
    }
}
