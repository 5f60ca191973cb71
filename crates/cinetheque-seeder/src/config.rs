//! Seeder configuration, read once from the environment and handed to the services

use anyhow::Context;
use std::env;

const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TMDB_LANGUAGE: &str = "en";
const DEFAULT_TMDB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MOVIE_PAGES: u32 = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct TmdbConfig {
    pub base_url: String,
    /// v4 read access token, sent as a bearer token
    pub api_key: String,
    pub language: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeederConfig {
    pub database_url: String,
    pub tmdb: TmdbConfig,
    /// Pages of `/movie/changes` imported by `movies` when `--pages` is absent
    pub movie_pages: u32,
}

impl SeederConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let api_key = lookup("TMDB_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("TMDB_API_KEY must be set"))?;

        let base_url = lookup("TMDB_API_URL")
            .unwrap_or_else(|| DEFAULT_TMDB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let language = lookup("TMDB_LANGUAGE").unwrap_or_else(|| DEFAULT_TMDB_LANGUAGE.to_string());
        let timeout_secs = match lookup("TMDB_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("TMDB_TIMEOUT_SECS must be a number of seconds")?,
            None => DEFAULT_TMDB_TIMEOUT_SECS,
        };
        let movie_pages = match lookup("SEED_MOVIE_PAGES") {
            Some(raw) => raw
                .parse::<u32>()
                .context("SEED_MOVIE_PAGES must be a positive integer")?,
            None => DEFAULT_MOVIE_PAGES,
        };

        let config = SeederConfig {
            database_url,
            tmdb: TmdbConfig {
                base_url,
                api_key,
                language,
                timeout_secs,
            },
            movie_pages,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }
        if !(self.tmdb.base_url.starts_with("http://") || self.tmdb.base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!("TMDB_API_URL must be an http(s) URL"));
        }
        if self.movie_pages == 0 {
            return Err(anyhow::anyhow!("SEED_MOVIE_PAGES must be at least 1"));
        }
        Ok(())
    }
}
