//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::response::ApiResponse;
use super::types::{
    SearchMovieParams, SearchTvParams, TmdbMovieDetails, TmdbSearchMovieResponse,
    TmdbSearchTvResponse, TmdbTvDetails, TmdbTvSeason,
};

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
/// `TmdbClient` implements `TmdbApi` (and `LocalTmdbApi` through the
/// blanket impl), so generic code can bound on either.
///
/// Every operation returns the typed response regardless of HTTP status;
/// use [`ApiResponse::into_result`] to treat non-2xx as an error.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Searches for movies (`search-movie`).
    ///
    /// # Errors
    ///
    /// Returns an error if a request editor or the security source fails,
    /// the transport fails, or a 2xx body cannot be decoded.
    async fn search_movie(
        &self,
        params: &SearchMovieParams,
    ) -> Result<ApiResponse<TmdbSearchMovieResponse>>;

    /// Searches for TV series (`search-tv`).
    ///
    /// # Errors
    ///
    /// Returns an error if a request editor or the security source fails,
    /// the transport fails, or a 2xx body cannot be decoded.
    async fn search_tv(&self, params: &SearchTvParams) -> Result<ApiResponse<TmdbSearchTvResponse>>;

    /// Fetches movie details (`movie-details`).
    ///
    /// # Errors
    ///
    /// Returns an error if a request editor or the security source fails,
    /// the transport fails, or a 2xx body cannot be decoded.
    async fn movie_details(
        &self,
        movie_id: u64,
        language: &str,
    ) -> Result<ApiResponse<TmdbMovieDetails>>;

    /// Fetches TV series details including season list (`tv-series-details`).
    ///
    /// # Errors
    ///
    /// Returns an error if a request editor or the security source fails,
    /// the transport fails, or a 2xx body cannot be decoded.
    async fn tv_details(&self, series_id: u64, language: &str)
    -> Result<ApiResponse<TmdbTvDetails>>;

    /// Fetches TV season details including episode list (`tv-season-details`).
    ///
    /// # Errors
    ///
    /// Returns an error if a request editor or the security source fails,
    /// the transport fails, or a 2xx body cannot be decoded.
    async fn tv_season(
        &self,
        series_id: u64,
        season_number: u32,
        language: &str,
    ) -> Result<ApiResponse<TmdbTvSeason>>;
}
