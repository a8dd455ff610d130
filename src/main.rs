use clap::Parser;
use oai_tester::{Console, Harvester, HarvesterArgs, OaiConfig};
use tracing::info;

/// Walks the ListRecords pages of an OAI-PMH service
#[derive(Debug, Parser)]
#[command(name = "oai-tester")]
#[command(about = "Walks the ListRecords pages of an OAI-PMH service", long_about = None)]
struct Cli {
    #[command(flatten)]
    harvest: HarvesterArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first, then .env.local can override
    let _ = dotenvy::from_filename_override(".env");
    let _ = dotenvy::from_filename_override(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let config = OaiConfig::from(args.harvest);
    info!(
        "Harvesting {} records from {}",
        config.metadata_prefix, config.endpoint
    );

    let harvester = Harvester::new(config)?;
    let mut console = Console::stdout();
    harvester.run(&mut console).await?;

    Ok(())
}
