use crate::calendar::print_calendar;
use crate::server;
use clap::{Args, Parser, Subcommand};
use council_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Council Application Portal",
    about = "Run the student-council application and interview portal",
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
    /// Print the interview calendar: dates, slot tables, and seat capacities
    Calendar,
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
        Command::Calendar => {
            print_calendar();
            Ok(())
        }
    }
}
