use std::path::PathBuf;

use clap::Parser;

use blogapi::{config::AppConfig, db::PgStore, export::export_site, store::Store};

/// Generate static JSON for every post in the database.
#[derive(Parser, Debug)]
#[command(name = "static-gen", version)]
struct Args {
    /// Output directory for the static site
    #[arg(short, long, default_value = "static")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "blogapi=info".to_string()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;
    tracing::info!(dir = %args.output.display(), "generating static site");

    let store = PgStore::connect(&config.database).await?;
    let count = export_site(&store, &args.output).await?;
    store.close().await;

    println!("Static site generation complete! Generated {count} posts.");
    Ok(())
}
