use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "rosco-jobctl", version, about = "Unpack Rosco remote job contexts")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write config files and the job script from a job context file
    Unpack(commands::unpack::UnpackArgs),
    /// Build a job context file from a local config directory
    Pack(commands::pack::PackArgs),
    /// Print a decoded job context with credentials redacted
    Inspect(commands::inspect::InspectArgs),
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Unpack(args) => commands::unpack::run(args),
        Commands::Pack(args) => commands::pack::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
    }
}
