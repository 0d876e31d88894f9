use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ledgerfolio::cli::OutputFormat;
use ledgerfolio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ledgerfolio::AppCommand {
    fn from(cmd: Commands) -> ledgerfolio::AppCommand {
        match cmd {
            Commands::Summary => ledgerfolio::AppCommand::Summary,
            Commands::Returns => ledgerfolio::AppCommand::Returns,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display total balance and balance by type and risk
    Summary,
    /// Display annualized returns per investment
    Returns,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let result = match cli.command {
        Some(Commands::Setup) => ledgerfolio::cli::setup::setup(),
        Some(cmd) => ledgerfolio::run_command(cmd.into(), cli.config_path.as_deref(), format),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
