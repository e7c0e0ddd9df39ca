use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use stream_scout::config::{DEFAULT_COUNTRY, DEFAULT_GRAPHQL_URL, DEFAULT_TIMEOUT_SECS};
use stream_scout::core::StreamingCatalog;
use stream_scout::domain::model::CountryCode;
use stream_scout::utils::logger;
use stream_scout::JustWatchClient;

/// 列出某國家可用的串流服務與計費類型
#[derive(Debug, Parser)]
#[command(name = "list_providers")]
struct Args {
    #[arg(long, short, default_value = DEFAULT_COUNTRY)]
    country: String,

    #[arg(long, default_value = DEFAULT_GRAPHQL_URL)]
    api_endpoint: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let country: CountryCode = args
        .country
        .parse()
        .with_context(|| format!("invalid country code: {}", args.country))?;
    let client = JustWatchClient::new(&args.api_endpoint, Duration::from_secs(args.timeout_secs))?;

    let directory = client
        .providers(&country)
        .await
        .context("failed to fetch the provider directory")?;

    println!("🌍 Providers in {} ({}):", country, directory.len());
    for (technical_name, clear_name) in directory.sorted_entries() {
        println!("  {:<24} {}", technical_name, clear_name);
    }

    let types = client
        .monetization_types(&country)
        .await
        .context("failed to fetch monetization types")?;
    let types: Vec<String> = types.into_iter().collect();
    println!("💳 Monetization types: {}", types.join(", "));

    Ok(())
}
