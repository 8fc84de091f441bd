use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use dolarve::core::log::init_logging;
use dolarve::core::{Field, RateMode};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Currency {
    Usd,
    Ves,
}

impl From<Currency> for Field {
    fn from(currency: Currency) -> Field {
        match currency {
            Currency::Usd => Field::Source,
            Currency::Ves => Field::Target,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the current official, market and average rates
    Rates,
    /// Convert an amount between USD and VES
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Currency the amount is given in
        #[arg(short, long, value_enum, default_value_t = Currency::Usd)]
        from: Currency,
        /// Rate to use: official, market or average
        #[arg(short, long)]
        mode: Option<RateMode>,
    },
    /// Interactive converter that keeps rates up to date
    Watch,
}

impl From<Commands> for dolarve::AppCommand {
    fn from(cmd: Commands) -> dolarve::AppCommand {
        match cmd {
            Commands::Rates => dolarve::AppCommand::Rates,
            Commands::Convert { amount, from, mode } => dolarve::AppCommand::Convert {
                amount,
                from: from.into(),
                mode,
            },
            Commands::Watch => dolarve::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => dolarve::cli::setup::setup(),
        Some(cmd) => dolarve::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
