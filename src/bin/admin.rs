//! CLI administration tool for link-shortener.
//!
//! Provides commands for managing links, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List all links
//! cargo run --bin admin -- link list
//!
//! # Create a link, optionally with a custom code
//! cargo run --bin admin -- link create https://example.com --code promo1
//!
//! # Delete a link
//! cargo run --bin admin -- link delete promo1
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `CODE_LENGTH` (optional): length of generated codes, 6-8
//! - `REDIS_URL` (optional): redirect cache to invalidate on create and delete

use link_shortener::application::services::LinkService;
use link_shortener::infrastructure::cache::{CacheService, NullCache, RedisCache};
use link_shortener::infrastructure::persistence::PgLinkRepository;
use link_shortener::utils::code_generator::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

type PgLinkService = LinkService<PgLinkRepository>;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List all links, newest first
    List,

    /// Create a short link
    Create {
        /// Destination URL (http or https)
        url: String,

        /// Custom short code (6-8 letters or digits)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Delete a short link
    Delete {
        /// Short code to delete
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = LinkService::new(repo).with_code_length(code_length_from_env()?);

    match action {
        LinkAction::List => list_links(&service).await?,
        LinkAction::Create { url, code } => {
            let cache = connect_cache().await;
            create_link(&service, cache.as_ref(), url, code).await?
        }
        LinkAction::Delete { code, yes } => {
            let cache = connect_cache().await;
            delete_link(&service, cache.as_ref(), code, yes).await?
        }
    }

    Ok(())
}

/// Connects the redirect cache used by the server, if `REDIS_URL` is set.
///
/// Without it, a deleted or recreated code could keep redirecting to its old
/// URL until the cache entry expires.
async fn connect_cache() -> Box<dyn CacheService> {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return Box::new(NullCache::new());
    };

    // Only invalidation is used; the TTL is irrelevant here
    match RedisCache::connect(&redis_url, 1).await {
        Ok(cache) => Box::new(cache),
        Err(e) => {
            println!(
                "{}",
                format!("Redis unavailable ({e}); cached redirects will expire with their TTL")
                    .yellow()
            );
            Box::new(NullCache::new())
        }
    }
}

/// Drops the cached redirect for `code`, warning on failure.
async fn invalidate_cached(cache: &dyn CacheService, code: &str) {
    if let Err(e) = cache.invalidate(code).await {
        println!(
            "{}",
            format!("Failed to invalidate cached redirect: {e}").yellow()
        );
    }
}

/// Reads `CODE_LENGTH`, falling back to the default.
fn code_length_from_env() -> Result<usize> {
    let Ok(raw) = std::env::var("CODE_LENGTH") else {
        return Ok(DEFAULT_CODE_LENGTH);
    };

    let length: usize = raw
        .parse()
        .with_context(|| format!("CODE_LENGTH must be a number, got '{raw}'"))?;

    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        anyhow::bail!(
            "CODE_LENGTH must be between {} and {}, got {}",
            MIN_CODE_LENGTH,
            MAX_CODE_LENGTH,
            length
        );
    }

    Ok(length)
}

/// Lists all links as a table.
///
/// # Output Format
///
/// ```text
/// Links
///
///   Code      Clicks  Created           Last click        URL
///   ------------------------------------------------------------------------------------
///   promo1    12      2025-01-15 10:30  2025-01-20 08:12  https://example.com/sale
///   launch    0       2025-01-16 09:00  never             https://example.com/launch
/// ```
async fn list_links(service: &PgLinkService) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!(
            "  Create one with: {} admin link create <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<9} {:<7} {:<17} {:<17} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last click".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "-".repeat(93).bright_black());

    for link in &links {
        let last_click = match link.last_clicked_at {
            Some(at) => at.format("%Y-%m-%d %H:%M").to_string().normal(),
            _ => "never".bright_black(),
        };

        println!(
            "  {:<9} {:<7} {:<17} {:<17} {}",
            link.code.cyan(),
            link.clicks.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_click,
            link.url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Creates a link through the same validation path as the HTTP API.
///
/// Any cached redirect left over from a deleted link with this code is dropped.
async fn create_link(
    service: &PgLinkService,
    cache: &dyn CacheService,
    url: String,
    code: Option<String>,
) -> Result<()> {
    println!("{}", "Create Link".bright_blue().bold());
    println!();

    let link = service
        .create_link(url, code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    invalidate_cached(cache, &link.code).await;

    println!("{}", "Link created successfully!".green().bold());
    println!();
    println!("  Code: {}", link.code.bright_yellow().bold());
    println!("  URL:  {}", link.url.cyan());
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(
    service: &PgLinkService,
    cache: &dyn CacheService,
    code: String,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Delete Link".bright_blue().bold());
    println!();

    let link = service
        .get_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Code:   {}", link.code.cyan());
    println!("  URL:    {}", link.url);
    println!("  Clicks: {}", link.clicks.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    invalidate_cached(cache, &code).await;

    println!();
    println!("{}", "Link deleted successfully!".green().bold());
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let service = LinkService::new(Arc::new(PgLinkRepository::new(Arc::new(pool.clone()))));
    let (links_count, clicks_count) = service
        .totals()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Links:  {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks: {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
