use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use thesis_agent::agent;
use thesis_agent::stocks::ProviderConfig;

#[derive(Parser, Debug)]
#[command(name = "thesis_agent", about = "Investment thesis & risk synthesis memo for a single stock")]
struct Cli {
    /// Decision policy (JSON)
    #[arg(long, default_value = "data/valuation_inputs.json")]
    policy: PathBuf,

    /// Where to write the memo
    #[arg(long, default_value = "outputs/sample_investment_memo.txt")]
    output: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let analysis = agent::run(&cli.policy, &cli.output, ProviderConfig::default()).await?;
    println!("{}", analysis.memo);

    Ok(())
}
