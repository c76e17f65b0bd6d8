//! tmdb - TMDB API command-line client.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, AuthScheme, TmdbConfig, resolve_config_path};
use tmdb_api::{
    DEFAULT_SERVER_BASE_URL, LocalTmdbApi, SearchMovieParams, SearchTvParams, TmdbClient,
};

/// Environment variable holding the API token.
const TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// Response language used when neither `--language` nor config sets one.
const DEFAULT_LANGUAGE: &str = "en-US";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// How the token is sent.
    #[arg(long, global = true, value_enum)]
    auth_scheme: Option<AuthScheme>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search for movies.
    SearchMovie(SearchMovieArgs),
    /// Search for TV series.
    SearchTv(SearchTvArgs),
    /// Get movie details.
    MovieDetails(MovieDetailsArgs),
    /// Get TV series details.
    TvDetails(TvDetailsArgs),
    /// Get TV season details.
    TvSeason(TvSeasonArgs),
    /// Show or edit the config file.
    Config(ConfigCommand),
}

/// Arguments for the `search-movie` subcommand.
#[derive(clap::Args)]
struct SearchMovieArgs {
    /// Search query (e.g. "すずめの戸締まり").
    #[arg(long, required = true)]
    query: String,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
    /// Filter by year.
    #[arg(long)]
    year: Option<u32>,
    /// Result page.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `search-tv` subcommand.
#[derive(clap::Args)]
struct SearchTvArgs {
    /// Search query (e.g. "SPY×FAMILY").
    #[arg(long, required = true)]
    query: String,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
    /// Filter by year.
    #[arg(long)]
    year: Option<u32>,
    /// Result page.
    #[arg(long, default_value_t = 1)]
    page: u32,
}

/// Arguments for the `movie-details` subcommand.
#[derive(clap::Args)]
struct MovieDetailsArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: u64,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `tv-details` subcommand.
#[derive(clap::Args)]
struct TvDetailsArgs {
    /// TMDB series ID.
    #[arg(long, required = true)]
    id: u64,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `tv-season` subcommand.
#[derive(clap::Args)]
struct TvSeasonArgs {
    /// TMDB series ID.
    #[arg(long, required = true)]
    id: u64,
    /// Season number.
    #[arg(long, required = true)]
    season: u32,
    /// Response language (default: config or "en-US").
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the resolved configuration.
    Show,
    /// Write values to the config file.
    ///
    /// The global --base-url and --auth-scheme flags are saved as well.
    Set(ConfigSetArgs),
}

/// Arguments for the `config set` subcommand.
#[derive(clap::Args)]
struct ConfigSetArgs {
    /// API read access token or API key.
    #[arg(long)]
    api_token: Option<String>,
    /// Default response language.
    #[arg(long)]
    language: Option<String>,
}

/// Options shared by every API subcommand.
struct GlobalOpts<'a> {
    /// Config directory override.
    dir: Option<&'a Path>,
    /// Base URL override.
    base_url: Option<&'a str>,
    /// Auth scheme override.
    auth_scheme: Option<AuthScheme>,
}

/// Loads the config file selected by `--dir`.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the file is invalid.
fn load_config(dir: Option<&Path>) -> Result<(PathBuf, AppConfig)> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    Ok((config_path, config))
}

/// Builds a `TmdbClient` from flags, `TMDB_API_TOKEN`, and the config file.
///
/// # Errors
///
/// Returns an error if no token is configured or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(opts: &GlobalOpts<'_>, config: &TmdbConfig) -> Result<TmdbClient> {
    let api_token = config.resolve_api_token(std::env::var(TOKEN_ENV).ok())?;

    let mut builder = TmdbClient::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(url) = opts.base_url.or(config.base_url.as_deref()) {
        builder = builder.base_url(url);
    }

    let builder = match opts.auth_scheme.unwrap_or(config.auth_scheme) {
        AuthScheme::Bearer => builder.token(api_token),
        AuthScheme::ApiKey => builder.api_key(api_token),
    };

    builder.build().context("failed to build TMDB client")
}

/// Picks `--language`, then the config default, then "en-US".
fn resolve_language(arg: Option<&str>, config: &TmdbConfig) -> String {
    arg.or(config.language.as_deref())
        .map_or_else(|| String::from(DEFAULT_LANGUAGE), String::from)
}

/// Runs the `search-movie` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search_movie(args: &SearchMovieArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (_, config) = load_config(opts.dir)?;
    let client = build_tmdb_client(opts, &config.tmdb)?;

    let language = resolve_language(args.language.as_deref(), &config.tmdb);
    let mut params = SearchMovieParams::new(&args.query)
        .language(language)
        .page(args.page);
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let response = client
        .search_movie(&params)
        .await
        .context("TMDB search/movie request failed")?
        .into_result()?;

    tracing::info!(
        "Total results: {} (page {}/{})",
        response.total_results,
        response.page,
        response.total_pages
    );
    tracing::info!("ID\tTitle\t\t\tOrigLang\tReleaseDate");
    for result in &response.results {
        tracing::info!(
            "{}\t{}\t{}\t\t{}",
            result.id,
            result.title,
            result.original_language,
            result.release_date.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Runs the `search-tv` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search_tv(args: &SearchTvArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (_, config) = load_config(opts.dir)?;
    let client = build_tmdb_client(opts, &config.tmdb)?;

    let language = resolve_language(args.language.as_deref(), &config.tmdb);
    let mut params = SearchTvParams::new(&args.query)
        .language(language)
        .page(args.page);
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let response = client
        .search_tv(&params)
        .await
        .context("TMDB search/tv request failed")?
        .into_result()?;

    tracing::info!(
        "Total results: {} (page {}/{})",
        response.total_results,
        response.page,
        response.total_pages
    );
    tracing::info!("ID\tName\t\t\tOrigLang\tCountry\t\tFirstAirDate");
    for result in &response.results {
        tracing::info!(
            "{}\t\t{}\t{}\t\t{}\t\t{}",
            result.id,
            result.name,
            result.original_language,
            result.origin_country.join(","),
            result.first_air_date.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Runs the `movie-details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_movie_details(args: &MovieDetailsArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (_, config) = load_config(opts.dir)?;
    let client = build_tmdb_client(opts, &config.tmdb)?;

    let language = resolve_language(args.language.as_deref(), &config.tmdb);
    let details = client
        .movie_details(args.id, &language)
        .await
        .context("TMDB movie details request failed")?
        .into_result()?;

    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    tracing::info!("Original Title: {}", details.original_title);
    tracing::info!(
        "Release Date: {}",
        details.release_date.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "Runtime: {}",
        details
            .runtime
            .map_or_else(|| String::from("-"), |r| format!("{r}min"))
    );
    tracing::info!("Status: {}", details.status.as_deref().unwrap_or("-"));
    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    tracing::info!("Genres: {}", genres.join(", "));

    Ok(())
}

/// Runs the `tv-details` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tv_details(args: &TvDetailsArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (_, config) = load_config(opts.dir)?;
    let client = build_tmdb_client(opts, &config.tmdb)?;

    let language = resolve_language(args.language.as_deref(), &config.tmdb);
    let details = client
        .tv_details(args.id, &language)
        .await
        .context("TMDB tv details request failed")?
        .into_result()?;

    tracing::info!("ID: {}", details.id);
    tracing::info!("Name: {}", details.name);
    tracing::info!("Original Name: {}", details.original_name);
    tracing::info!(
        "First Air Date: {}",
        details.first_air_date.as_deref().unwrap_or("-")
    );
    tracing::info!("Status: {}", details.status.as_deref().unwrap_or("-"));
    tracing::info!("Seasons: {}", details.number_of_seasons);
    tracing::info!("Episodes: {}", details.number_of_episodes);
    tracing::info!("---");
    for season in &details.seasons {
        tracing::info!(
            "  Season {}: {} episodes (air_date: {})",
            season.season_number,
            season.episode_count,
            season.air_date.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Runs the `tv-season` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_tv_season(args: &TvSeasonArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (_, config) = load_config(opts.dir)?;
    let client = build_tmdb_client(opts, &config.tmdb)?;

    let language = resolve_language(args.language.as_deref(), &config.tmdb);
    let season = client
        .tv_season(args.id, args.season, &language)
        .await
        .context("TMDB tv season request failed")?
        .into_result()?;

    tracing::info!(
        "Season {}: {}",
        season.season_number,
        season.name.as_deref().unwrap_or("-")
    );
    tracing::info!("Episodes:");
    for ep in &season.episodes {
        tracing::info!(
            "  E{:02}: {} (air_date: {}, runtime: {}min)",
            ep.episode_number,
            ep.name,
            ep.air_date.as_deref().unwrap_or("-"),
            ep.runtime
                .map_or_else(|| String::from("-"), |r| r.to_string()),
        );
    }

    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read.
#[instrument(skip_all)]
fn run_config_show(opts: &GlobalOpts<'_>) -> Result<()> {
    let (config_path, config) = load_config(opts.dir)?;
    let tmdb = &config.tmdb;

    tracing::info!("Config file: {}", config_path.display());
    tracing::info!(
        "api_token: {}",
        tmdb.masked_api_token()
            .unwrap_or_else(|| String::from("(not set)"))
    );
    tracing::info!(
        "base_url: {}",
        tmdb.base_url.as_deref().unwrap_or(DEFAULT_SERVER_BASE_URL)
    );
    tracing::info!("auth_scheme: {}", tmdb.auth_scheme.as_str());
    tracing::info!(
        "language: {}",
        tmdb.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    );

    Ok(())
}

/// Runs the `config set` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
#[instrument(skip_all)]
fn run_config_set(args: &ConfigSetArgs, opts: &GlobalOpts<'_>) -> Result<()> {
    let (config_path, mut config) = load_config(opts.dir)?;

    if let Some(ref token) = args.api_token {
        config.tmdb.api_token = Some(token.clone());
    }
    if let Some(ref language) = args.language {
        config.tmdb.language = Some(language.clone());
    }
    if let Some(url) = opts.base_url {
        config.tmdb.base_url = Some(String::from(url));
    }
    if let Some(scheme) = opts.auth_scheme {
        config.tmdb.auth_scheme = scheme;
    }

    config.save(&config_path).context("failed to save config")?;
    tracing::info!("Saved config to {}", config_path.display());

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let opts = GlobalOpts {
        dir: cli.dir.as_deref(),
        base_url: cli.base_url.as_deref(),
        auth_scheme: cli.auth_scheme,
    };
    match cli.command {
        Commands::SearchMovie(ref args) => run_search_movie(args, &opts).await,
        Commands::SearchTv(ref args) => run_search_tv(args, &opts).await,
        Commands::MovieDetails(ref args) => run_movie_details(args, &opts).await,
        Commands::TvDetails(ref args) => run_tv_details(args, &opts).await,
        Commands::TvSeason(ref args) => run_tv_season(args, &opts).await,
        Commands::Config(ref cmd) => match cmd.command {
            ConfigSubcommands::Show => run_config_show(&opts),
            ConfigSubcommands::Set(ref args) => run_config_set(args, &opts),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_language_prefers_flag() {
        // Arrange
        let config = TmdbConfig {
            language: Some(String::from("ja-JP")),
            ..TmdbConfig::default()
        };

        // Act & Assert
        assert_eq!(resolve_language(Some("fr-FR"), &config), "fr-FR");
        assert_eq!(resolve_language(None, &config), "ja-JP");
        assert_eq!(resolve_language(None, &TmdbConfig::default()), "en-US");
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        // Arrange & Act
        let cli = Cli::try_parse_from([
            "tmdb",
            "tv-season",
            "--id",
            "120089",
            "--season",
            "1",
            "--auth-scheme",
            "api-key",
        ]);

        // Assert
        assert!(cli.is_ok_and(|c| c.auth_scheme == Some(AuthScheme::ApiKey)));
    }
}
