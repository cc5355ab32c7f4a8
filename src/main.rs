// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing::info;

use webarc::cli::{Cli, Commands};
use webarc::config::AssemblyConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Assemble { config } => {
            info!("Loading assembly descriptor {}", config.display());
            let assembly = AssemblyConfig::load(&config)?.into_assembly();
            let report = assembly.run()?;
            println!(
                "Assembled {} ({} layers, {} paths)",
                assembly.output_dir.display(),
                report.layers,
                report.registered_paths
            );
            Ok(())
        }
    }
}
