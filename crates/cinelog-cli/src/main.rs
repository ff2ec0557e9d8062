//! cinelog - movie catalog CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

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

use crate::config::{AppConfig, parse_base_url, resolve_config_path};
use cinelog_api::MovieId;
use cinelog_api::store::{RecordId, StoreClient};
use cinelog_api::tmdb::{ImageSize, TmdbClient, image_url};
use cinelog_core::{
    DetailAggregator, MovieDetailView, ReviewBoard, ReviewDraft, Session, SessionFile,
    SqliteDetailCache, WatchlistState, login, register, today, watchlist,
};

/// User-Agent sent to both remote services.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Movie details and trailers.
    Movie(MovieCommand),
    /// Personal watchlist.
    Watchlist(WatchlistCommand),
    /// Star ratings and reviews.
    Review(ReviewCommand),
    /// Local response cache maintenance.
    Cache(CacheCommand),
    /// Login session.
    Auth(AuthCommand),
    /// Configuration file.
    Config(ConfigCommand),
}

/// Arguments selecting one movie.
#[derive(clap::Args)]
struct MovieIdArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
}

/// Arguments for the `movie` subcommand.
#[derive(clap::Args)]
struct MovieCommand {
    /// Movie subcommand to run.
    #[command(subcommand)]
    command: MovieSubcommands,
}

/// Available movie subcommands.
#[derive(Subcommand)]
enum MovieSubcommands {
    /// Show details, cast, trailer and similar titles.
    Show(MovieShowArgs),
    /// Show the trailer links.
    Trailer(MovieIdArgs),
}

/// Arguments for the `movie show` subcommand.
#[derive(clap::Args)]
struct MovieShowArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
    /// Response language (default: `catalog.language` from config).
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `watchlist` subcommand.
#[derive(clap::Args)]
struct WatchlistCommand {
    /// Watchlist subcommand to run.
    #[command(subcommand)]
    command: WatchlistSubcommands,
}

/// Available watchlist subcommands.
#[derive(Subcommand)]
enum WatchlistSubcommands {
    /// Show whether a movie is saved.
    Status(MovieIdArgs),
    /// Save or unsave a movie.
    Toggle(MovieIdArgs),
    /// List saved movies.
    List,
}

/// Arguments for the `review` subcommand.
#[derive(clap::Args)]
struct ReviewCommand {
    /// Review subcommand to run.
    #[command(subcommand)]
    command: ReviewSubcommands,
}

/// Available review subcommands.
#[derive(Subcommand)]
enum ReviewSubcommands {
    /// List reviews of a movie.
    List(MovieIdArgs),
    /// Post a review.
    Add(ReviewAddArgs),
    /// Delete a review.
    Delete(ReviewDeleteArgs),
}

/// Arguments for the `review add` subcommand.
#[derive(clap::Args)]
struct ReviewAddArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
    /// Star rating (1-10).
    #[arg(long, required = true)]
    rating: u8,
    /// Review text.
    #[arg(long, required = true)]
    comment: String,
    /// Author name (default: logged-in user, or "Guest").
    #[arg(long)]
    user: Option<String>,
}

/// Arguments for the `review delete` subcommand.
#[derive(clap::Args)]
struct ReviewDeleteArgs {
    /// TMDB movie ID.
    #[arg(long, required = true)]
    id: MovieId,
    /// Review ID assigned by the store.
    #[arg(long, required = true)]
    review: String,
}

/// Arguments for the `cache` subcommand.
#[derive(clap::Args)]
struct CacheCommand {
    /// Cache subcommand to run.
    #[command(subcommand)]
    command: CacheSubcommands,
}

/// Available cache subcommands.
#[derive(Subcommand)]
enum CacheSubcommands {
    /// Show entry counts.
    Stats,
    /// Remove expired entries.
    Prune,
    /// Remove all entries.
    Clear,
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Log in and remember the user.
    Login(LoginArgs),
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the logged-in user.
    Logout,
    /// Show the logged-in user.
    Whoami,
}

/// Arguments for the `auth login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Account password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `auth register` subcommand.
#[derive(clap::Args)]
struct RegisterArgs {
    /// Display name.
    #[arg(long, required = true)]
    name: String,
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Account password.
    #[arg(long, required = true)]
    password: String,
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
    /// Write a config file with default values if none exists.
    Init,
    /// Print the effective configuration.
    Show,
}

/// Loads `config.toml`, falling back to defaults.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds the TMDB client. The token is read from `TMDB_API_TOKEN`.
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    TmdbClient::builder()
        .base_url(parse_base_url(&config.catalog.base_url)?)
        .api_token(api_token)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build TMDB client")
}

/// Builds the json-server store client.
fn build_store_client(config: &AppConfig) -> Result<StoreClient> {
    StoreClient::builder()
        .base_url(parse_base_url(&config.store.base_url)?)
        .user_agent(USER_AGENT)
        .timeout(config.store.timeout())
        .min_interval(config.store.min_interval())
        .build()
        .context("failed to build store client")
}

/// Opens the response cache in the data directory.
fn open_cache(dir: Option<&PathBuf>, config: &AppConfig) -> Result<SqliteDetailCache> {
    SqliteDetailCache::open(dir, config.cache.policy())
}

/// Opens the session file in the data directory.
fn session_file(dir: Option<&PathBuf>) -> Result<SessionFile> {
    let data_dir = cinelog_db::resolve_data_dir(dir).context("failed to resolve data directory")?;
    Ok(SessionFile::in_dir(&data_dir))
}

/// Returns the watchlist owner for the session (`None` for guests).
fn session_owner(session: &Session) -> Option<&RecordId> {
    session.user.as_ref().map(|u| &u.id)
}

/// Logs a detail view.
fn log_detail_view(view: &MovieDetailView, image_base: &str) {
    let record = &view.record;
    tracing::info!(
        "{} ({})",
        record.title,
        view.release_year()
            .map_or_else(|| String::from("-"), |y| y.to_string())
    );
    tracing::info!("Rating: {}/10", view.rating_label());
    if !record.overview.is_empty() {
        tracing::info!("{}", record.overview);
    }
    if let Some(url) = image_url(image_base, ImageSize::W500, record.poster_path.as_deref()) {
        tracing::info!("Poster: {url}");
    }
    if let Some(url) = image_url(image_base, ImageSize::Original, record.backdrop_path.as_deref())
    {
        tracing::info!("Backdrop: {url}");
    }
    if let Some(trailer) = &view.trailer {
        tracing::info!("Trailer: {}", trailer.watch_url());
    }

    tracing::info!("Cast ({}):", view.cast.len());
    for member in &view.cast {
        let profile = image_url(image_base, ImageSize::W185, member.profile_path.as_deref());
        tracing::info!(
            "  {}\t{}\t{}",
            member.name,
            member.character.as_deref().unwrap_or("-"),
            profile.as_deref().unwrap_or("-")
        );
    }

    tracing::info!("Similar ({}):", view.similar.len());
    for title in &view.similar {
        tracing::info!("  {:>8}  {}", title.id, title.title);
    }

    for failure in &view.enrichment_failures {
        tracing::warn!("Incomplete view, {failure}");
    }
}

/// Runs the `movie show` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the cache cannot be
/// opened, or the core record is unavailable.
#[instrument(skip_all)]
async fn run_movie_show(args: &MovieShowArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    let cache = open_cache(dir, &config)?;
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| config.catalog.language.clone());

    let aggregator = DetailAggregator::new(&client, &cache, language);
    let view = aggregator
        .load_detail(args.id)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;

    log_detail_view(&view, &config.catalog.image_base_url);
    Ok(())
}

/// Runs the `movie trailer` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the cache cannot be
/// opened, or the core record is unavailable.
#[instrument(skip_all)]
async fn run_movie_trailer(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client(&config)?;
    let cache = open_cache(dir, &config)?;

    let aggregator = DetailAggregator::new(&client, &cache, config.catalog.language.clone());
    let view = aggregator
        .load_detail(args.id)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;

    match &view.trailer {
        Some(trailer) => {
            tracing::info!("{}", view.record.title);
            tracing::info!("Watch: {}", trailer.watch_url());
            tracing::info!("Embed: {}", trailer.embed_url());
        }
        None => tracing::info!("No trailer available for {}", view.record.title),
    }
    Ok(())
}

/// Runs the `watchlist status` subcommand.
///
/// # Errors
///
/// Returns an error if the store request fails.
#[instrument(skip_all)]
async fn run_watchlist_status(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;
    let session = session_file(dir)?.load()?;

    let state = watchlist::load_state(&store, args.id, session_owner(&session))
        .await
        .context("failed to read watchlist")?;
    match state {
        WatchlistState::Saved(record) => {
            tracing::info!("{} is on the watchlist (entry {})", record.title, record.id);
        }
        WatchlistState::NotSaved => tracing::info!("Movie {} is not on the watchlist", args.id),
    }
    Ok(())
}

/// Runs the `watchlist toggle` subcommand.
///
/// # Errors
///
/// Returns an error if the movie cannot be resolved or a store request fails.
#[instrument(skip_all)]
async fn run_watchlist_toggle(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;
    let session = session_file(dir)?.load()?;
    let user_id = session_owner(&session);

    let state = watchlist::load_state(&store, args.id, user_id)
        .await
        .context("failed to read watchlist")?;

    let client = build_tmdb_client(&config)?;
    let cache = open_cache(dir, &config)?;
    let aggregator = DetailAggregator::new(&client, &cache, config.catalog.language.clone());
    let movie = aggregator
        .load_record(args.id)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;

    let new_state = watchlist::toggle(&store, &state, &movie, user_id)
        .await
        .context("failed to update watchlist")?;

    if new_state.is_saved() {
        tracing::info!("Added {} to the watchlist", movie.title);
    } else {
        tracing::info!("Removed {} from the watchlist", movie.title);
    }
    Ok(())
}

/// Runs the `watchlist list` subcommand.
///
/// # Errors
///
/// Returns an error if the store request fails.
#[instrument(skip_all)]
async fn run_watchlist_list(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;
    let session = session_file(dir)?.load()?;

    let entries = watchlist::list(&store, session_owner(&session))
        .await
        .context("failed to list watchlist")?;

    tracing::info!("ID\tMovieID\tRelease\t\tRating\tTitle");
    for entry in &entries {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            entry.id,
            entry.movie_id,
            entry.release_date.as_deref().unwrap_or("-"),
            entry
                .vote_average
                .map_or_else(|| String::from("-"), |v| format!("{v:.1}")),
            entry.title,
        );
    }
    tracing::info!("Total: {} movies", entries.len());
    Ok(())
}

/// Runs the `review list` subcommand.
///
/// # Errors
///
/// Returns an error if the store request fails.
#[instrument(skip_all)]
async fn run_review_list(args: &MovieIdArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;

    let board = ReviewBoard::load(&store, args.id)
        .await
        .context("failed to load reviews")?;

    tracing::info!("ID\tRating\tDate\t\tUser\tComment");
    for review in board.reviews() {
        tracing::info!(
            "{}\t{}/10\t{}\t{}\t{}",
            review.id,
            review.rating,
            review.date,
            review.user,
            review.comment
        );
    }
    if let Some(average) = board.average_rating() {
        tracing::info!("Average: {average:.1}/10 ({} reviews)", board.reviews().len());
    } else {
        tracing::info!("No reviews yet");
    }
    Ok(())
}

/// Runs the `review add` subcommand.
///
/// The draft is validated before any request is sent.
///
/// # Errors
///
/// Returns an error if validation fails or the store rejects the review.
#[instrument(skip_all)]
async fn run_review_add(args: &ReviewAddArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;
    let session = session_file(dir)?.load()?;

    let author = args
        .user
        .clone()
        .unwrap_or_else(|| String::from(session.author_name()));
    let draft = ReviewDraft::new(args.rating, args.comment.clone());

    let mut board = ReviewBoard::new(args.id);
    let stored = board
        .submit(&store, &draft, &author, &today())
        .await
        .context("failed to submit review")?;

    tracing::info!(
        "Posted review {} ({}/10) by {}",
        stored.id,
        stored.rating,
        stored.user
    );
    Ok(())
}

/// Runs the `review delete` subcommand.
///
/// # Errors
///
/// Returns an error if a store request fails.
#[instrument(skip_all)]
async fn run_review_delete(args: &ReviewDeleteArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;

    let mut board = ReviewBoard::load(&store, args.id)
        .await
        .context("failed to load reviews")?;
    let review_id = RecordId::new(args.review.clone());
    board
        .delete(&store, &review_id)
        .await
        .context("failed to delete review")?;

    tracing::info!(
        "Deleted review {} ({} remaining)",
        review_id,
        board.reviews().len()
    );
    Ok(())
}

/// Runs the `cache` subcommands.
///
/// # Errors
///
/// Returns an error if the cache database cannot be opened or queried.
#[instrument(skip_all)]
fn run_cache(command: &CacheSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let cache = open_cache(dir, &config)?;

    match command {
        CacheSubcommands::Stats => {
            let stats = cache.stats().context("failed to read cache stats")?;
            let policy = cache.policy();
            tracing::info!(
                "Total: {} entries ({} fresh, {} stale)",
                stats.total,
                stats.fresh,
                stats.stale
            );
            tracing::info!(
                "Policy: ttl {} days, capacity {}",
                policy.ttl.num_days(),
                policy.capacity
            );
        }
        CacheSubcommands::Prune => {
            let removed = cache.prune().context("failed to prune cache")?;
            tracing::info!("Pruned {removed} stale entries");
        }
        CacheSubcommands::Clear => {
            let removed = cache.clear().context("failed to clear cache")?;
            tracing::info!("Cleared {removed} entries");
        }
    }
    Ok(())
}

/// Runs the `auth login` subcommand.
///
/// # Errors
///
/// Returns an error if the credentials are rejected or the session cannot be saved.
#[instrument(skip_all)]
async fn run_auth_login(args: &LoginArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;

    let user = login(&store, &args.email, &args.password)
        .await
        .context("login failed")?;
    session_file(dir)?
        .save(&Session::logged_in(user.clone()))
        .context("failed to save session")?;

    tracing::info!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

/// Runs the `auth register` subcommand.
///
/// # Errors
///
/// Returns an error if the email is taken or the store request fails.
#[instrument(skip_all)]
async fn run_auth_register(args: &RegisterArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let store = build_store_client(&config)?;

    let user = register(&store, &args.name, &args.email, &args.password)
        .await
        .context("registration failed")?;

    tracing::info!(
        "Registered {} <{}>. Run `auth login` to sign in.",
        user.name,
        user.email
    );
    Ok(())
}

/// Runs the `auth logout` subcommand.
///
/// # Errors
///
/// Returns an error if the session file cannot be removed.
#[instrument(skip_all)]
fn run_auth_logout(dir: Option<&PathBuf>) -> Result<()> {
    session_file(dir)?
        .clear()
        .context("failed to clear session")?;
    tracing::info!("Logged out");
    Ok(())
}

/// Runs the `auth whoami` subcommand.
///
/// # Errors
///
/// Returns an error if the session file cannot be read.
#[instrument(skip_all)]
fn run_auth_whoami(dir: Option<&PathBuf>) -> Result<()> {
    let session = session_file(dir)?
        .load()
        .context("failed to load session")?;
    match session.user {
        Some(user) => tracing::info!("Logged in as {} <{}>", user.name, user.email),
        None => tracing::info!("Not logged in"),
    }
    Ok(())
}

/// Runs the `config` subcommands.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
#[instrument(skip_all)]
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    match command {
        ConfigSubcommands::Init => {
            if config_path.exists() {
                tracing::info!("Config already exists at {}", config_path.display());
                return Ok(());
            }
            AppConfig::default()
                .save(&config_path)
                .context("failed to save config")?;
            tracing::info!("Wrote default config to {}", config_path.display());
        }
        ConfigSubcommands::Show => {
            let config = AppConfig::load(&config_path).context("failed to load config")?;
            tracing::info!("# {}", config_path.display());
            for line in config.to_toml()?.lines() {
                tracing::info!("{line}");
            }
        }
    }
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
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Movie(cmd) => match cmd.command {
            MovieSubcommands::Show(args) => run_movie_show(&args, dir).await,
            MovieSubcommands::Trailer(args) => run_movie_trailer(&args, dir).await,
        },
        Commands::Watchlist(cmd) => match cmd.command {
            WatchlistSubcommands::Status(args) => run_watchlist_status(&args, dir).await,
            WatchlistSubcommands::Toggle(args) => run_watchlist_toggle(&args, dir).await,
            WatchlistSubcommands::List => run_watchlist_list(dir).await,
        },
        Commands::Review(cmd) => match cmd.command {
            ReviewSubcommands::List(args) => run_review_list(&args, dir).await,
            ReviewSubcommands::Add(args) => run_review_add(&args, dir).await,
            ReviewSubcommands::Delete(args) => run_review_delete(&args, dir).await,
        },
        Commands::Cache(cmd) => run_cache(&cmd.command, dir),
        Commands::Auth(cmd) => match cmd.command {
            AuthSubcommands::Login(args) => run_auth_login(&args, dir).await,
            AuthSubcommands::Register(args) => run_auth_register(&args, dir).await,
            AuthSubcommands::Logout => run_auth_logout(dir),
            AuthSubcommands::Whoami => run_auth_whoami(dir),
        },
        Commands::Config(cmd) => run_config(&cmd.command, dir),
    }
}
