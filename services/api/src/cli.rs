use crate::demo::{run_demo, validate_layout, DemoArgs, ValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hostel_ops::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Hostel Operations",
    about = "Run the hostel room inventory service or exercise it from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and expiry sweeper (default command)
    Serve(ServeArgs),
    /// Work with floor layout files
    Architecture {
        #[command(subcommand)]
        command: ArchitectureCommand,
    },
    /// Walk an in-memory hostel through assignment, exchange, removal and expiry
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ArchitectureCommand {
    /// Check a floor layout file and print its room and bed totals
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the expiry sweep cadence in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) sweep_interval_secs: Option<u64>,
    /// Do not start the background expiry sweeper
    #[arg(long)]
    pub(crate) no_sweeper: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Architecture {
            command: ArchitectureCommand::Validate(args),
        } => validate_layout(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
