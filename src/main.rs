mod cli;

use audioproxy::proxy::CacheKey;
use clap::Parser;
use cli::{Cli, Commands};
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    audioproxy::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => audioproxy::api::run(args.address, args.config).await?,
        Commands::Key(args) => {
            // Offline: no allow-list, only the derivation
            let url = Url::parse(&args.url)?;
            println!("{}", CacheKey::from_parts(&args.url, &url));
        }
    }

    Ok(())
}
