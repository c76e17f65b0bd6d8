//! TMDB API client library.
//!
//! Wraps a `reqwest` client bound to a fixed base URL, with an ordered
//! list of request editors (bearer token injection among them) and an
//! optional security source for the raw API-key scheme.

mod api;
mod client;
mod editor;
mod response;
mod security;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_SERVER_BASE_URL, TmdbClient, TmdbClientBuilder};
pub use editor::{RequestEditorFn, apply_request_editors, bearer_token_editor, request_editor};
pub use response::{ApiResponse, Response};
pub use security::{LocalSecuritySource, Sec0, SecuritySource, StaticApiKey};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    SearchMovieParams, SearchTvParams, TmdbEpisode, TmdbErrorResponse, TmdbGenre,
    TmdbMovieDetails, TmdbMovieSearchResult, TmdbSearchMovieResponse, TmdbSearchTvResponse,
    TmdbSeasonSummary, TmdbTvDetails, TmdbTvSearchResult, TmdbTvSeason,
};
