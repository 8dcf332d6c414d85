use clap::Parser;
use pinecone_probe::{config::DEFAULT_ENV_FILE, Config, SUCCESS_MESSAGE};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Upsert a fixed test vector into the Pinecone index to check credentials and index setup",
    long_about = None
)]
struct Args {
    /// KEY=VALUE file read before the process environment is consulted
    #[arg(short, long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is reserved for the confirmation line
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let config = Config::load(&args.env_file)?;
    info!(?config, env_file = %args.env_file.display(), "Configuration loaded");

    pinecone_probe::run(&config).await?;

    println!("{}", SUCCESS_MESSAGE);
    Ok(())
}
