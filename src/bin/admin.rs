//! Operator commands for book-service that bypass the HTTP API.
//!
//! ```bash
//! admin migrate              # apply pending migrations
//! admin migrate down -t 0    # revert everything, asks first
//! admin seed --count 100     # generated books, through the cached stack
//! admin seed --node-id 1022   # mint ids on a node no server uses
//! admin stats                # live and soft-deleted counts
//! admin db check             # SELECT 1
//! admin db info              # server version
//! ```
//!
//! Reads the same environment as the server (see [`book_service::config`]).

use book_service::config::{self, Config};
use book_service::server;
use book_service::utils::fake_books::fake_book;
use book_service::utils::id_generator::MAX_NODE_ID;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

/// book-service administration.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply or revert SQL migrations
    Migrate {
        #[arg(value_enum, default_value_t = Direction::Up)]
        direction: Direction,

        /// Version to revert down to (exclusive) when going down
        #[arg(short, long, default_value_t = 0)]
        target: i64,

        /// Revert without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Insert generated books
    Seed {
        /// Number of books to create
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Id generator node for seeded rows; keep it apart from every
        /// running server's NODE_ID so minted ids cannot collide
        #[arg(long, default_value_t = MAX_NODE_ID, value_parser = node_id_parser())]
        node_id: u16,
    },

    /// Count live and soft-deleted books
    Stats,

    /// Connectivity diagnostics
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

#[derive(Subcommand)]
enum DbAction {
    /// Run `SELECT 1`
    Check,

    /// Print the server version
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Migrate {
            direction,
            target,
            yes,
        } => migrate(&connect(&config).await?, direction, target, yes).await?,
        Commands::Seed { count, node_id } => seed(&seeder_config(&config, node_id), count).await?,
        Commands::Stats => handle_stats(&connect(&config).await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect(&config).await?).await?,
    }

    Ok(())
}

fn node_id_parser() -> clap::builder::RangedI64ValueParser<u16> {
    clap::value_parser!(u16).range(0..=i64::from(MAX_NODE_ID))
}

/// The server's settings with the seeder's own id generator node.
fn seeder_config(config: &Config, node_id: u16) -> Config {
    Config {
        node_id,
        ..config.clone()
    }
}

async fn connect(config: &Config) -> Result<PgPool> {
    PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Applies pending migrations, or reverts down to `target` after confirmation.
async fn migrate(pool: &PgPool, direction: Direction, target: i64, skip_confirm: bool) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");

    match direction {
        Direction::Up => {
            println!("{}", "⬆️  Applying migrations...".bright_blue());

            migrator
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
        Direction::Down => {
            println!(
                "{}",
                format!("⬇️  Reverting migrations above version {target}").bright_blue()
            );

            if !skip_confirm {
                let confirmed = Confirm::new()
                    .with_prompt("Reverting drops data. Continue?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            migrator
                .undo(pool, target)
                .await
                .context("Failed to revert migrations")?;

            println!("{}", "✅ Migrations reverted".green().bold());
        }
    }

    Ok(())
}

/// Creates `count` generated books through the cache-aside stack, so cached
/// list pages and counts are invalidated as they would be by the API.
///
/// A failed insert is reported and the run continues.
async fn seed(config: &Config, count: usize) -> Result<()> {
    println!(
        "{}",
        format!("🌱 Seeding {count} books").bright_blue().bold()
    );

    let db = server::connect_database(config).await?;
    let cache = server::connect_cache(config).await;
    let service = server::book_service(config, db.clone(), cache)?;

    let mut created = 0usize;
    for _ in 0..count {
        let input = fake_book(&mut rand::rng());
        let title = input.title.clone();

        match service.create(input).await {
            Ok(book) => {
                created += 1;
                println!("  {} {}", book.id.to_string().bright_black(), book.title.cyan());
            }
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), title, e);
            }
        }
    }

    if let Ok(pool) = db.handle() {
        pool.close().await;
    }

    println!();
    println!(
        "{}",
        format!("✅ Created {created} of {count} books").green().bold()
    );

    Ok(())
}

/// Displays live and soft-deleted book counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await?;

    let deleted: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NOT NULL")
            .fetch_one(pool)
            .await?;

    println!("  Books:         {}", live.to_string().bright_green().bold());
    println!("  Deleted books: {}", deleted.to_string().bright_black());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_node_id(args: &[&str]) -> Result<u16, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Seed { node_id, .. } => Ok(node_id),
            _ => panic!("expected the seed command"),
        }
    }

    #[test]
    fn test_seed_uses_its_own_node_by_default() {
        assert_eq!(seed_node_id(&["admin", "seed"]).unwrap(), MAX_NODE_ID);
        assert_eq!(
            seed_node_id(&["admin", "seed", "--count", "5", "--node-id", "7"]).unwrap(),
            7
        );
    }

    #[test]
    fn test_seed_rejects_out_of_range_node_id() {
        let too_wide = (MAX_NODE_ID + 1).to_string();
        assert!(seed_node_id(&["admin", "seed", "--node-id", &too_wide]).is_err());
        assert!(seed_node_id(&["admin", "seed", "--node-id", "-1"]).is_err());
    }

    #[test]
    fn test_seeder_config_only_changes_node_id() {
        let config = Config {
            database_url: "postgres://books:pass@db/books".to_string(),
            redis_url: Some("redis://cache:6379/0".to_string()),
            listen_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            db_max_connections: 5,
            db_min_connections: 3,
            db_connect_timeout: 30,
            db_idle_timeout: 600,
            db_max_lifetime: 3600,
            db_ping_interval: 1,
            db_retry_attempts: 3,
            cache_namespace: "book".to_string(),
            cache_ttl_seconds: Some(3600),
            request_timeout: 30,
            run_migrations: true,
            node_id: 1,
        };

        let seeder = seeder_config(&config, 1022);

        assert_eq!(seeder.node_id, 1022);
        assert_eq!(config.node_id, 1);
        assert_eq!(seeder.database_url, config.database_url);
        assert_eq!(seeder.cache_namespace, config.cache_namespace);
        assert!(seeder.validate().is_ok());
    }
}
