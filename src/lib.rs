pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Field, RateMode, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Convert {
        amount: String,
        from: Field,
        /// Overrides the configured mode.
        mode: Option<RateMode>,
    },
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("dolarve starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RateProvider> =
        Arc::new(providers::DollarApiProvider::new(&config.endpoint)?);

    match command {
        AppCommand::Rates => cli::rates::run(provider.as_ref(), &config).await,
        AppCommand::Convert { amount, from, mode } => {
            let mode = mode.unwrap_or(config.mode);
            cli::convert::run(provider.as_ref(), &amount, from, mode, &config).await
        }
        AppCommand::Watch => cli::watch::run(&config, provider).await,
    }
}
