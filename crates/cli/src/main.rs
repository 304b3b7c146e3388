use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use catalog::{GenreId, MovieId, MovieProvider, MovieSummary, PersonId};
use server::{RecommendationOrchestrator, RecommendationResponse, Settings};
use std::path::PathBuf;
use std::time::Instant;
use strategies::{DEFAULT_LIMIT, RecommendationContext};
use tracing::debug;

/// MoviePulse - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "moviepulse")]
#[command(about = "Movie recommendations from content, genre, mood and actor signals", long_about = None)]
struct Cli {
    /// Directory of the static catalog files (overrides MOVIEPULSE_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory of the per-user files (overrides MOVIEPULSE_USER_DATA_DIR)
    #[arg(short, long, global = true)]
    user_data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get movie recommendations
    Recommend {
        /// Movie to find similar content for
        #[arg(long)]
        movie: Option<MovieId>,

        /// Comma-separated genre ids
        #[arg(long, value_delimiter = ',')]
        genres: Vec<GenreId>,

        /// Mood such as "uplifting" or "tense"
        #[arg(long)]
        mood: Option<String>,

        /// Comma-separated person ids of favourite actors
        #[arg(long, value_delimiter = ',')]
        actors: Vec<PersonId>,

        /// User to personalize for
        #[arg(long)]
        user: Option<String>,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Always consult the fallback chain
        #[arg(long)]
        force_fallback: bool,

        /// Quality of the primary results (0.0-1.0); low values enable the popularity fallback
        #[arg(long)]
        quality_score: Option<f32>,

        /// Show reasons and sources for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Record that a user watched a movie
    Watch {
        #[arg(long)]
        user: String,

        #[arg(long)]
        movie: MovieId,
    },

    /// Show a user's watch history, newest first
    History {
        #[arg(long)]
        user: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a user's stored genre affinity
    Affinity {
        #[arg(long)]
        user: String,
    },

    /// Manage a user's watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },

    /// List popular movies
    Popular {
        /// Restrict to one genre id
        #[arg(long)]
        genre: Option<GenreId>,

        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Search for movies by title
    Search {
        #[arg(long)]
        title: String,

        #[arg(long)]
        year: Option<u16>,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    Add {
        #[arg(long)]
        user: String,
        #[arg(long)]
        movie: MovieId,
    },
    Remove {
        #[arg(long)]
        user: String,
        #[arg(long)]
        movie: MovieId,
    },
    List {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.data_dir {
        settings = settings.with_data_dir(dir);
    }
    if let Some(dir) = cli.user_data_dir {
        settings = settings.with_user_data_dir(dir);
    }

    debug!(
        data_dir = %settings.data_dir.display(),
        user_data_dir = %settings.user_data_dir.display(),
        tmdb = settings.tmdb_config().is_some(),
        "Resolved settings"
    );

    println!("Loading catalog from {}...", settings.data_dir.display());
    let start = Instant::now();
    let orchestrator = RecommendationOrchestrator::from_settings(&settings)
        .await
        .context("Failed to initialise MoviePulse")?;
    let (movies, mappings, embeddings) = orchestrator.catalog().counts();
    println!(
        "{} Loaded {} movies, {} genre mappings, {} embeddings in {:?} (provider: {})",
        "✓".green(),
        movies,
        mappings,
        embeddings,
        start.elapsed(),
        orchestrator.provider().name()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            movie,
            genres,
            mood,
            actors,
            user,
            limit,
            force_fallback,
            quality_score,
            explain,
        } => {
            let mut context = RecommendationContext::new()
                .with_genres(genres)
                .with_actors(actors)
                .with_limit(limit)
                .with_force_fallback(force_fallback);
            if let Some(movie) = movie {
                context = context.with_target_movie(movie);
            }
            if let Some(mood) = mood {
                context = context.with_mood(mood);
            }
            if let Some(user) = user {
                context = context.with_user(user);
            }
            if let Some(score) = quality_score {
                context = context.with_quality_score(score);
            }
            handle_recommend(&orchestrator, context, explain).await?
        }
        Commands::Watch { user, movie } => handle_watch(&orchestrator, &user, movie).await?,
        Commands::History { user, limit } => handle_history(&orchestrator, &user, limit)?,
        Commands::Affinity { user } => handle_affinity(&orchestrator, &user)?,
        Commands::Watchlist { action } => handle_watchlist(&orchestrator, action).await?,
        Commands::Popular { genre, limit } => {
            let movies = orchestrator
                .provider()
                .popular_movies(genre, limit)
                .await
                .context("Failed to list popular movies")?;
            print_movie_list("Popular movies", &movies);
        }
        Commands::Search { title, year } => {
            let movies = orchestrator
                .provider()
                .search_movies(&title, year)
                .await
                .context("Search failed")?;
            print_movie_list(&format!("Search results for '{}'", title), &movies);
        }
    }

    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    context: RecommendationContext,
    explain: bool,
) -> Result<()> {
    let response = orchestrator.get_recommendations(context).await?;
    print_recommendations(&response, explain);
    Ok(())
}

/// Handle the 'watch' command
async fn handle_watch(
    orchestrator: &RecommendationOrchestrator,
    user: &str,
    movie: MovieId,
) -> Result<()> {
    let entry = orchestrator.record_watch(user, movie).await?;
    println!(
        "{} Recorded movie {} for {} [{}]",
        "✓".green(),
        entry.movie_id,
        user,
        entry.genres.join(", ")
    );
    Ok(())
}

/// Handle the 'history' command
fn handle_history(
    orchestrator: &RecommendationOrchestrator,
    user: &str,
    limit: Option<usize>,
) -> Result<()> {
    let history = orchestrator.watch_history().user_history(user, limit, true)?;

    println!("{}", format!("Watch history for {}:", user).bold().blue());
    if history.is_empty() {
        println!("  (nothing watched yet)");
    }
    for entry in &history {
        let title = orchestrator
            .catalog()
            .get_movie(entry.movie_id)
            .map(|m| m.title.clone())
            .unwrap_or_else(|| format!("Movie {}", entry.movie_id));
        println!(
            "{}{} - {} [{}] via {}",
            "• ".green(),
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            title,
            entry.genres.join(", "),
            entry.source
        );
    }
    Ok(())
}

/// Handle the 'affinity' command
fn handle_affinity(orchestrator: &RecommendationOrchestrator, user: &str) -> Result<()> {
    println!("{}", format!("Genre affinity for {}:", user).bold().blue());

    let Some(affinity) = orchestrator.watch_history().affinity(user)? else {
        println!("  (no affinity recorded yet)");
        return Ok(());
    };

    println!("{}Movies watched: {}", "• ".cyan(), affinity.total_watched);
    println!("{}Top genres: {}", "• ".cyan(), affinity.top_genres.join(", "));
    let mut counts: Vec<_> = affinity.genre_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (genre, count) in counts {
        println!("  - {}: {}", genre, count);
    }
    Ok(())
}

/// Handle the 'watchlist' subcommands
async fn handle_watchlist(
    orchestrator: &RecommendationOrchestrator,
    action: WatchlistAction,
) -> Result<()> {
    match action {
        WatchlistAction::Add { user, movie } => {
            if orchestrator.add_to_watchlist(&user, movie).await? {
                println!("{} Added movie {} to {}'s watchlist", "✓".green(), movie, user);
            } else {
                println!("Movie {} is already on {}'s watchlist", movie, user);
            }
        }
        WatchlistAction::Remove { user, movie } => {
            if orchestrator.watchlist().remove(&user, movie)? {
                println!("{} Removed movie {} from {}'s watchlist", "✓".green(), movie, user);
            } else {
                println!("Movie {} was not on {}'s watchlist", movie, user);
            }
        }
        WatchlistAction::List { user } => {
            let items = orchestrator.watchlist().list(&user)?;
            println!("{}", format!("Watchlist for {}:", user).bold().blue());
            if items.is_empty() {
                println!("  (empty)");
            }
            for item in items {
                println!(
                    "{}{}: {} (added {})",
                    "• ".green(),
                    item.movie_id,
                    item.title,
                    item.added.format("%Y-%m-%d")
                );
            }
        }
    }
    Ok(())
}

fn print_movie_list(header: &str, movies: &[MovieSummary]) {
    println!("{}", format!("{}:", header).bold().blue());
    if movies.is_empty() {
        println!("  (no matches)");
    }
    for movie in movies {
        let year = movie.release_date.get(..4).unwrap_or("????");
        println!(
            "{}: {} ({}) - {:.1}/10 from {} votes, popularity {:.1}",
            movie.id, movie.title, year, movie.vote_average, movie.vote_count, movie.popularity
        );
    }
}

/// Helper function to format and print recommendations
fn print_recommendations(response: &RecommendationResponse, explain: bool) {
    print!("{}", "Movie Recommendations:\n".bold().blue());
    if response.recommendations.is_empty() {
        println!("  (no recommendations; try genres, a mood or a movie id)");
    }

    for (i, rec) in response.recommendations.iter().enumerate() {
        let year = rec
            .metadata
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "????".to_string());
        let marker = if rec.is_fallback {
            " (fallback)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}. {} ({}) [{}] - Score: {:.2}{}",
            (i + 1).to_string().green(),
            rec.title,
            year,
            rec.metadata.genres.join(", "),
            rec.score,
            marker
        );
        if explain {
            println!("   Reason: {} via {}", rec.reason, rec.source_strategy.cyan());
            if let Some(label) = &rec.metadata.reason_label {
                println!("   {}", label.italic());
            }
            if let Some(error) = &rec.metadata.error {
                println!("   {}", format!("Lookup error: {}", error).red());
            }
        }
    }

    if explain {
        let meta = &response.metadata;
        println!(
            "\nRequest {} in {} ms, strategies: {}",
            meta.request_id,
            meta.elapsed_ms,
            meta.strategies_used.join(", ")
        );
        if let Some(fallback) = &meta.fallback_strategy {
            println!("Fallback used: {}", fallback.yellow());
        }
    }
}
