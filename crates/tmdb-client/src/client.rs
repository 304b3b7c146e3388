//! Async TMDB REST client.

use crate::error::{Result, TmdbError};
use crate::models::{RawGenreList, RawMovie, RawPage, RawPersonCredits};
use async_trait::async_trait;
use catalog::{Genre, GenreId, Movie, MovieId, MovieProvider, MovieSummary, PersonId};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Base delay for exponential backoff between attempts
const BACKOFF_BASE_MS: u64 = 200;

/// Upper bound on pages fetched for one list query (20 results per page)
const MAX_PAGES: u32 = 10;

/// Connection settings for the TMDB client
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Total attempts per request, including the first one
    pub max_retries: u32,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Client for The Movie Database REST API
///
/// Authenticates with the `api_key` query parameter and retries transient
/// failures with exponential backoff.
#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    config: TmdbConfig,
}

impl TmdbClient {
    /// Build a client from its configuration
    ///
    /// # Returns
    /// `TmdbError::Config` if the API key is empty or the HTTP client cannot
    /// be constructed
    pub fn new(config: TmdbConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(TmdbError::Config("TMDB API key is empty".to_string()));
        }
        if config.max_retries == 0 {
            return Err(TmdbError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }

        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TmdbError::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(base_url = %config.base_url, "TMDB client ready");
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Core request handler: GET with retries
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        let mut last_err: Option<TmdbError> = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay_ms = BACKOFF_BASE_MS * (1u64 << (attempt - 1));
                debug!(endpoint, attempt, delay_ms, "Retrying TMDB request");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            match self.get_once(&url, endpoint, params).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(endpoint, attempt, error = %e, "TMDB request failed");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            TmdbError::Config("request was never attempted".to_string())
        }))
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TmdbError::Status {
                status,
                endpoint: endpoint.to_string(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TmdbError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Full movie details including credits, `None` for unknown ids
    #[instrument(skip(self))]
    pub async fn get_movie_details(&self, movie_id: MovieId) -> Result<Option<Movie>> {
        let endpoint = format!("movie/{}", movie_id);
        let params = [("append_to_response", "credits".to_string())];
        match self.get_json::<RawMovie>(&endpoint, &params).await {
            Ok(raw) => Ok(Some(raw.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Popular movies, or a popularity-sorted genre discovery when a genre is
    /// given. Pages are fetched until `limit` results are collected.
    #[instrument(skip(self))]
    pub async fn get_popular(
        &self,
        genre: Option<GenreId>,
        limit: usize,
    ) -> Result<Vec<MovieSummary>> {
        let mut movies = Vec::new();
        let mut page = 1u32;

        while movies.len() < limit && page <= MAX_PAGES {
            let raw: RawPage = match genre {
                Some(g) => {
                    let params = [
                        ("with_genres", g.to_string()),
                        ("sort_by", "popularity.desc".to_string()),
                        ("page", page.to_string()),
                    ];
                    self.get_json("discover/movie", &params).await?
                }
                None => {
                    let params = [("page", page.to_string())];
                    self.get_json("movie/popular", &params).await?
                }
            };

            if raw.results.is_empty() {
                break;
            }
            movies.extend(raw.results.into_iter().map(MovieSummary::from));
            page += 1;
        }

        movies.truncate(limit);
        debug!(count = movies.len(), "Fetched popular movies");
        Ok(movies)
    }

    /// Movies a person acted in or directed, deduplicated by id
    #[instrument(skip(self))]
    pub async fn get_person_movies(&self, person_id: PersonId) -> Result<Vec<MovieSummary>> {
        let endpoint = format!("person/{}/movie_credits", person_id);
        let raw: RawPersonCredits = self.get_json(&endpoint, &[]).await?;

        let mut seen = HashSet::new();
        Ok(raw
            .cast
            .into_iter()
            .chain(raw.crew)
            .filter(|m| seen.insert(m.id))
            .map(MovieSummary::from)
            .collect())
    }

    pub async fn get_genres(&self) -> Result<Vec<Genre>> {
        let raw: RawGenreList = self.get_json("genre/movie/list", &[]).await?;
        Ok(raw.genres)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, year: Option<u16>) -> Result<Vec<MovieSummary>> {
        let mut params = vec![
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }

        let raw: RawPage = self.get_json("search/movie", &params).await?;
        Ok(raw.results.into_iter().map(MovieSummary::from).collect())
    }
}

#[async_trait]
impl MovieProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn movie_details(&self, id: MovieId) -> anyhow::Result<Option<Movie>> {
        Ok(self.get_movie_details(id).await?)
    }

    async fn popular_movies(
        &self,
        genre: Option<GenreId>,
        limit: usize,
    ) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(self.get_popular(genre, limit).await?)
    }

    async fn person_filmography(&self, person: PersonId) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(self.get_person_movies(person).await?)
    }

    async fn genres(&self) -> anyhow::Result<Vec<Genre>> {
        Ok(self.get_genres().await?)
    }

    async fn search_movies(
        &self,
        query: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Vec<MovieSummary>> {
        Ok(self.search(query, year).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let result = TmdbClient::new(TmdbConfig::new("  "));
        assert!(matches!(result, Err(TmdbError::Config(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = TmdbClient::new(TmdbConfig::new("key").with_max_retries(0));
        assert!(matches!(result, Err(TmdbError::Config(_))));
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client =
            TmdbClient::new(TmdbConfig::new("key").with_base_url("http://localhost:9999/3/"))
                .unwrap();
        assert_eq!(
            client.endpoint_url("/movie/603"),
            "http://localhost:9999/3/movie/603"
        );
        assert_eq!(client.base_url(), "http://localhost:9999/3/");
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_retries() {
        // Bind then drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = TmdbConfig::new("key")
            .with_base_url(format!("http://127.0.0.1:{}", port))
            .with_timeout(Duration::from_millis(200))
            .with_max_retries(2);
        let client = TmdbClient::new(config).unwrap();

        let result = client.get_genres().await;
        assert!(matches!(result, Err(TmdbError::Request(_))));
    }
}
