//! HTTP client for the TMDB v3 API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::TmdbConfig;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("TMDB request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB answered {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Failed to build TMDB client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct ChangedMovie {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ChangesPage {
    #[serde(default)]
    results: Vec<ChangedMovie>,
}

/// The fields of `/movie/{id}` the importer reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    /// `YYYY-MM-DD`, sometimes empty
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    /// Minutes
    pub runtime: Option<i32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Where the seeder reads genres and movies from
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError>;

    /// Ids of the movies listed on one page of the change feed
    async fn changed_movie_ids(&self, page: u32) -> Result<Vec<i64>, TmdbError>;

    /// `None` when the movie no longer exists upstream
    async fn movie(&self, id: i64) -> Result<Option<MovieDetails>, TmdbError>;
}

#[derive(Clone, Debug)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TmdbError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, TmdbError> {
        let url = self.build_url(path);
        tracing::debug!(url = %url, "TMDB request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let response = self.send(path, query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.build_url(path),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Probe the credentials. A 401 is tolerated the same way the feed
    /// endpoints tolerate it; anything else non-2xx is an error.
    pub async fn authenticate(&self) -> Result<(), TmdbError> {
        let response = self.send("/authentication", &[]).await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("TMDB rejected the API key; requests may fail");
                Ok(())
            }
            status => Err(TmdbError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.build_url("/authentication"),
            }),
        }
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        let list: GenreList = self
            .get_json("/genre/movie/list", &[("language", self.language.clone())])
            .await?;
        Ok(list.genres)
    }

    async fn changed_movie_ids(&self, page: u32) -> Result<Vec<i64>, TmdbError> {
        let changes: ChangesPage = self
            .get_json("/movie/changes", &[("page", page.to_string())])
            .await?;
        Ok(changes.results.into_iter().map(|m| m.id).collect())
    }

    async fn movie(&self, id: i64) -> Result<Option<MovieDetails>, TmdbError> {
        let path = format!("/movie/{}", id);
        let response = self
            .send(&path, &[("language", self.language.clone())])
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<MovieDetails>().await?)),
            status => Err(TmdbError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.build_url(&path),
            }),
        }
    }
}
