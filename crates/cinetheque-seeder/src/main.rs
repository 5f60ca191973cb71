use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cinetheque_db::PgCatalog;
use cinetheque_infra::{init_telemetry, LogFormat};
use cinetheque_seeder::{CatalogSeeder, SeederConfig, TmdbClient};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "cinetheque-seed")]
#[command(about = "Import genres and movies from TMDB into the catalog")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create one category per TMDB movie genre
    Categories,
    /// Import movies from the TMDB change feed
    Movies {
        /// Pages of the change feed to import (default: SEED_MOVIE_PAGES)
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Categories first, then movies
    All {
        #[arg(long)]
        pages: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = SeederConfig::from_env()?;

    init_telemetry("cinetheque-seed", LogFormat::Pretty)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let client = TmdbClient::new(&config.tmdb)?;
    client
        .authenticate()
        .await
        .context("TMDB authentication failed")?;

    let seeder = CatalogSeeder::new(Arc::new(PgCatalog::new(pool)), Arc::new(client));

    match args.command {
        Command::Categories => {
            let created = seeder.seed_categories().await?;
            println!("Created {} categories", created);
        }
        Command::Movies { pages } => {
            let report = seeder
                .seed_movies(pages.unwrap_or(config.movie_pages))
                .await?;
            println!("{:?}", report);
        }
        Command::All { pages } => {
            let created = seeder.seed_categories().await?;
            println!("Created {} categories", created);
            let report = seeder
                .seed_movies(pages.unwrap_or(config.movie_pages))
                .await?;
            println!("{:?}", report);
        }
    }

    Ok(())
}
