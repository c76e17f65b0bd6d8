//! `TmdbClient` - TMDB API client implementation.

use anyhow::{Context, Result, bail};
use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::TmdbApi;
use super::editor::{RequestEditorFn, apply_request_editors, bearer_token_editor, request_editor};
use super::response::ApiResponse;
use super::security::{SecuritySource, StaticApiKey, apply_sec0};
use super::types::{
    SearchMovieParams, SearchTvParams, TmdbMovieDetails, TmdbSearchMovieResponse,
    TmdbSearchTvResponse, TmdbTvDetails, TmdbTvSeason,
};

/// Default TMDB API base URL.
pub const DEFAULT_SERVER_BASE_URL: &str = "https://api.themoviedb.org/";

/// User-Agent sent when none is configured.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// TMDB API client.
///
/// Bound to a single base URL for its whole lifetime. Every request runs
/// through the registered request editors in insertion order, then through
/// the security source if one is installed.
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient<S = StaticApiKey> {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests (always ends with `/`).
    base_url: Url,
    /// Request editors, applied in order.
    request_editors: Vec<RequestEditorFn>,
    /// `Sec0` security source.
    security_source: Option<S>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for TmdbClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("request_editors", &self.request_editors.len())
            .field("security_source", &self.security_source)
            .finish_non_exhaustive()
    }
}

/// Builder for `TmdbClient`.
///
/// Each option appends to or overrides the configuration; request editors
/// keep the order in which they were added.
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder<S = StaticApiKey> {
    base_url: Option<String>,
    user_agent: Option<String>,
    http_client: Option<Client>,
    request_editors: Vec<RequestEditorFn>,
    security_source: Option<S>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for TmdbClientBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClientBuilder")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("request_editors", &self.request_editors.len())
            .field("security_source", &self.security_source)
            .finish_non_exhaustive()
    }
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            http_client: None,
            request_editors: Vec::new(),
            security_source: None,
        }
    }
}

impl<S> TmdbClientBuilder<S> {
    /// Overrides the base URL (default: [`DEFAULT_SERVER_BASE_URL`]).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Authenticates requests with `Authorization: Bearer <token>`.
    ///
    /// Appends a request editor, so it overrides any `Authorization`
    /// header set by editors added before it.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.request_editors.push(bearer_token_editor(token));
        self
    }

    /// Appends a custom request editor.
    #[must_use]
    pub fn request_editor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Request) -> Result<()> + Send + Sync + 'static,
    {
        self.request_editors.push(request_editor(f));
        self
    }

    /// Appends an already-wrapped request editor.
    #[must_use]
    pub fn request_editor_fn(mut self, editor: RequestEditorFn) -> Self {
        self.request_editors.push(editor);
        self
    }

    /// Sets the User-Agent (default: `tmdb-api/<version>`).
    ///
    /// Ignored when a preconfigured HTTP client is supplied.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Uses a preconfigured `reqwest::Client` as transport.
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Installs a `Sec0` security source.
    #[must_use]
    pub fn security_source<T: SecuritySource>(self, source: T) -> TmdbClientBuilder<T> {
        TmdbClientBuilder {
            base_url: self.base_url,
            user_agent: self.user_agent,
            http_client: self.http_client,
            request_editors: self.request_editors,
            security_source: Some(source),
        }
    }

    /// Authenticates requests with the raw API key (`Authorization: <key>`).
    #[must_use]
    pub fn api_key(self, key: impl Into<String>) -> TmdbClientBuilder<StaticApiKey> {
        self.security_source(StaticApiKey::new(key))
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - The base URL is malformed or not `http`/`https`.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient<S>> {
        let base_url = match self.base_url {
            Some(ref url) => parse_base_url(url)?,
            None => parse_base_url(DEFAULT_SERVER_BASE_URL)?,
        };

        let http_client = if let Some(client) = self.http_client {
            client
        } else {
            let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
            Client::builder()
                .user_agent(user_agent)
                .gzip(true)
                .build()
                .context("failed to build HTTP client")?
        };

        tracing::debug!(
            base_url = %base_url,
            request_editors = self.request_editors.len(),
            security_source = self.security_source.is_some(),
            "TMDB client configured"
        );

        Ok(TmdbClient {
            http_client,
            base_url,
            request_editors: self.request_editors,
            security_source: self.security_source,
        })
    }
}

/// Parses `server` as a base URL, appending a trailing `/` to its path if
/// missing.
///
/// Query strings and fragments are rejected.
fn parse_base_url(server: &str) -> Result<Url> {
    let mut url = Url::parse(server).with_context(|| format!("invalid base URL: {server}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "invalid base URL: {server} (unsupported scheme {})",
            url.scheme()
        );
    }
    if url.query().is_some() || url.fragment().is_some() {
        bail!("invalid base URL: {server} (query and fragment are not allowed)");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Creates a client bound to `server` that sends `token` as a Bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if `server` is not a valid base URL or the HTTP
    /// client fails to build.
    pub fn new(server: &str, token: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(server).token(token).build()
    }

    /// Creates a client bound to [`DEFAULT_SERVER_BASE_URL`] that sends
    /// `token` as a Bearer token.
    ///
    /// Use [`TmdbClient::builder`] to register additional request editors.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new_default(token: impl Into<String>) -> Result<Self> {
        Self::builder().token(token).build()
    }
}

impl<S> TmdbClient<S> {
    /// Returns the base URL all endpoint paths are resolved against.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the number of registered request editors.
    pub fn request_editor_count(&self) -> usize {
        self.request_editors.len()
    }
}

impl<S: SecuritySource + Sync> TmdbClient<S> {
    /// Sends a GET request after running request editors and the
    /// security source.
    #[instrument(skip_all, fields(operation = operation_name))]
    async fn send_get<T: DeserializeOwned>(
        &self,
        operation_name: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let mut request = self
            .http_client
            .get(url)
            .query(query)
            .build()
            .with_context(|| format!("failed to build request: {operation_name}"))?;

        apply_request_editors(&self.request_editors, &mut request)?;
        if let Some(ref source) = self.security_source {
            apply_sec0(source, operation_name, &mut request).await?;
        }

        tracing::debug!(url = %request.url(), "TMDB API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {operation_name}"))?;

        tracing::debug!(status = %response.status(), "TMDB API response");

        ApiResponse::from_response(response)
            .await
            .with_context(|| format!("failed to decode response: {operation_name}"))
    }
}

impl<S: SecuritySource + Sync> TmdbApi for TmdbClient<S> {
    #[instrument(skip_all)]
    async fn search_movie(
        &self,
        params: &SearchMovieParams,
    ) -> Result<ApiResponse<TmdbSearchMovieResponse>> {
        self.send_get("search-movie", "3/search/movie", &params.to_query())
            .await
    }

    #[instrument(skip_all)]
    async fn search_tv(&self, params: &SearchTvParams) -> Result<ApiResponse<TmdbSearchTvResponse>> {
        self.send_get("search-tv", "3/search/tv", &params.to_query())
            .await
    }

    #[instrument(skip_all)]
    async fn movie_details(
        &self,
        movie_id: u64,
        language: &str,
    ) -> Result<ApiResponse<TmdbMovieDetails>> {
        let path = format!("3/movie/{movie_id}");
        let query = [("language", String::from(language))];
        self.send_get("movie-details", &path, &query).await
    }

    #[instrument(skip_all)]
    async fn tv_details(
        &self,
        series_id: u64,
        language: &str,
    ) -> Result<ApiResponse<TmdbTvDetails>> {
        let path = format!("3/tv/{series_id}");
        let query = [("language", String::from(language))];
        self.send_get("tv-series-details", &path, &query).await
    }

    #[instrument(skip_all)]
    async fn tv_season(
        &self,
        series_id: u64,
        season_number: u32,
        language: &str,
    ) -> Result<ApiResponse<TmdbTvSeason>> {
        let path = format!("3/tv/{series_id}/season/{season_number}");
        let query = [("language", String::from(language))];
        self.send_get("tv-season-details", &path, &query).await
    }
}
