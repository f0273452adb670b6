use crate::demo::{run_demo, run_normalize, run_status, DemoArgs, NormalizeArgs, StatusArgs};
use campus_verify::config::AppConfig;
use campus_verify::error::AppError;
use campus_verify::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Campus Verify",
    about = "Capture, normalize and submit student and driver verification documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the student then driver verification journey against an in-memory authority
    /// (default command)
    Demo(DemoArgs),
    /// Normalize a single photo (not HEIC) into an upload-ready JPEG and print its descriptor
    Normalize(NormalizeArgs),
    /// Resolve a raw authority status string and show what it unlocks
    Status(StatusArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args, &config).await,
        Command::Normalize(args) => run_normalize(args, &config).await,
        Command::Status(args) => {
            run_status(args);
            Ok(())
        }
    }
}
