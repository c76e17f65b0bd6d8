//! TMDB API response models and search parameters.
//!
//! TMDB returns `null` for several fields its schema marks as required
//! (`vote_average`, `adult`, every `*_path`), so those are `Option` here.

use serde::Deserialize;

// --- Search Movie ---

/// Response from `search/movie` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchMovieResponse {
    /// Current page number.
    pub page: u32,
    /// Search results.
    pub results: Vec<TmdbMovieSearchResult>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

/// A single movie search result.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieSearchResult {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Release date (YYYY-MM-DD, empty or null when unknown).
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Vote count.
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    pub adult: Option<bool>,
    /// Video flag.
    #[serde(default)]
    pub video: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

// --- Search TV ---

/// Response from `search/tv` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchTvResponse {
    /// Current page number.
    pub page: u32,
    /// Search results.
    pub results: Vec<TmdbTvSearchResult>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

/// A single TV series search result.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvSearchResult {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Original name.
    pub original_name: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Origin countries (ISO 3166-1).
    #[serde(default)]
    pub origin_country: Vec<String>,
    /// First air date.
    pub first_air_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Vote count.
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    pub adult: Option<bool>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

// --- Movie Details ---

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// IMDb ID (e.g., "tt0137523").
    pub imdb_id: Option<String>,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Tagline.
    pub tagline: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Release date.
    pub release_date: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Status (e.g., "Released").
    pub status: Option<String>,
    /// Budget in USD.
    #[serde(default)]
    pub budget: u64,
    /// Revenue in USD.
    #[serde(default)]
    pub revenue: u64,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Vote count.
    pub vote_count: u32,
    /// Adult flag.
    pub adult: Option<bool>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

// --- TV Details ---

/// Response from `tv/{series_id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvDetails {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Original name.
    pub original_name: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Origin countries (ISO 3166-1).
    #[serde(default)]
    pub origin_country: Vec<String>,
    /// First air date.
    pub first_air_date: Option<String>,
    /// Last air date.
    pub last_air_date: Option<String>,
    /// Total number of episodes.
    pub number_of_episodes: u32,
    /// Total number of seasons.
    pub number_of_seasons: u32,
    /// Season summaries.
    #[serde(default)]
    pub seasons: Vec<TmdbSeasonSummary>,
    /// Status (e.g., "Returning Series", "Ended").
    pub status: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: f64,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    /// Whether the show is still in production.
    pub in_production: bool,
    /// Poster image path.
    pub poster_path: Option<String>,
}

/// Season summary within TV details.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeasonSummary {
    /// TMDB season ID.
    pub id: u64,
    /// Season number (0 = specials).
    pub season_number: u32,
    /// Number of episodes in this season.
    pub episode_count: u32,
    /// Air date of this season.
    pub air_date: Option<String>,
    /// Season name.
    pub name: String,
    /// Season overview.
    pub overview: Option<String>,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Poster image path.
    pub poster_path: Option<String>,
}

/// Genre entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- TV Season Details ---

/// Response from `tv/{series_id}/season/{season_number}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvSeason {
    /// Internal `MongoDB` ID.
    #[serde(rename = "_id", default)]
    pub internal_id: Option<String>,
    /// TMDB season ID.
    pub id: u64,
    /// Season number.
    pub season_number: u32,
    /// Season name.
    pub name: Option<String>,
    /// Season overview.
    pub overview: Option<String>,
    /// Air date.
    pub air_date: Option<String>,
    /// Episodes in this season.
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Poster image path.
    pub poster_path: Option<String>,
}

/// A single episode within a season.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    /// TMDB episode ID.
    pub id: u64,
    /// Episode number within the season.
    pub episode_number: u32,
    /// Episode name.
    pub name: String,
    /// Episode overview.
    pub overview: Option<String>,
    /// Air date.
    pub air_date: Option<String>,
    /// Season number.
    pub season_number: u32,
    /// Parent show ID.
    pub show_id: u64,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Episode type (e.g., "standard", "finale").
    pub episode_type: Option<String>,
    /// Still image path.
    pub still_path: Option<String>,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    pub success: bool,
}

// --- Search Parameters ---

/// Parameters for `search/movie` endpoint.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Filter by primary release year.
    pub primary_release_year: Option<u32>,
    /// Filter by year.
    pub year: Option<u32>,
    /// Region filter (ISO 3166-1).
    pub region: Option<String>,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            primary_release_year: None,
            year: None,
            region: None,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the primary release year filter.
    #[must_use]
    pub const fn primary_release_year(mut self, year: u32) -> Self {
        self.primary_release_year = Some(year);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the region filter.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Includes adult content in results.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }

    /// Builds the query string pairs.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", self.query.clone()),
            ("language", self.language.clone()),
            ("page", self.page.to_string()),
            ("include_adult", self.include_adult.to_string()),
        ];
        if let Some(year) = self.primary_release_year {
            query.push(("primary_release_year", year.to_string()));
        }
        if let Some(year) = self.year {
            query.push(("year", year.to_string()));
        }
        if let Some(ref region) = self.region {
            query.push(("region", region.clone()));
        }
        query
    }
}

/// Parameters for `search/tv` endpoint.
#[derive(Debug, Clone)]
pub struct SearchTvParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Filter by first air date year.
    pub first_air_date_year: Option<u32>,
    /// Filter by year (searches first air date and episode air dates).
    pub year: Option<u32>,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchTvParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            first_air_date_year: None,
            year: None,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the first air date year filter.
    #[must_use]
    pub const fn first_air_date_year(mut self, year: u32) -> Self {
        self.first_air_date_year = Some(year);
        self
    }

    /// Sets the year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    /// Includes adult content in results.
    #[must_use]
    pub const fn include_adult(mut self, include: bool) -> Self {
        self.include_adult = include;
        self
    }

    /// Builds the query string pairs.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", self.query.clone()),
            ("language", self.language.clone()),
            ("page", self.page.to_string()),
            ("include_adult", self.include_adult.to_string()),
        ];
        if let Some(year) = self.first_air_date_year {
            query.push(("first_air_date_year", year.to_string()));
        }
        if let Some(year) = self.year {
            query.push(("year", year.to_string()));
        }
        query
    }
}
