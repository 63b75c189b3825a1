//! CLI administration tool for tinylink.
//!
//! Manages links and the database directly, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List active links
//! cargo run --bin admin -- links list
//!
//! # Show a link, including soft-deleted ones
//! cargo run --bin admin -- links show aB3dE9
//!
//! # Create a link with a chosen code
//! cargo run --bin admin -- links create https://example.com --code promo2025
//!
//! # Soft-delete a link without a prompt
//! cargo run --bin admin -- links delete aB3dE9 --yes
//!
//! # Check database connection / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*` components), `BASE_URL`,
//! `GENERATED_CODE_LENGTH`, `CODE_REUSE`, `STORE_TIMEOUT_MS`.

use tinylink::application::services::LinkService;
use tinylink::config::{self, Config, StorageBackend};
use tinylink::domain::entities::Link;
use tinylink::infrastructure::persistence::PgLinkRepository;
use tinylink::server::connect_database;
use tinylink::state::AppState;
use tinylink::utils::code_generator::RandomCodeGenerator;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing tinylink.
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
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List active links, newest first
    List,

    /// Show a single link, including soft-deleted ones
    Show {
        /// Short code
        code: String,
    },

    /// Create a new short link
    Create {
        /// Absolute http(s) URL to redirect to
        target: String,

        /// Custom short code (6-8 alphanumeric, generated if omitted)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Soft-delete a link
    Delete {
        /// Short code
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

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("admin requires STORAGE_BACKEND=postgres");
    }

    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Links { action } => handle_link_action(action, &config, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: PgPool) -> Result<()> {
    let repository =
        PgLinkRepository::new(Arc::new(pool)).with_reuse_policy(config.code_reuse);
    let service = LinkService::new(Arc::new(repository), Arc::new(RandomCodeGenerator))
        .with_code_length(config.generated_code_length)
        .with_store_timeout(config.store_timeout());
    let state = AppState::new(Arc::new(service), config.base_url.clone());

    match action {
        LinkAction::List => list_links(&state).await?,
        LinkAction::Show { code } => show_link(&state, &code).await?,
        LinkAction::Create { target, code } => create_link(&state, &target, code).await?,
        LinkAction::Delete { code, yes } => delete_link(&state, &code, yes).await?,
    }

    Ok(())
}

/// Lists active links.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code      Clicks   Created            Target
///   ──────────────────────────────────────────────────────────────
///   aB3dE9    12       2025-01-15 10:30   https://example.com/page
/// ```
async fn list_links(state: &AppState) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let links = state
        .link_service
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!(
            "  Create one with: {} admin links create <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<9} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<9} {:<8} {:<18} {}",
            link.code.cyan(),
            link.clicks.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.target
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn show_link(state: &AppState, code: &str) -> Result<()> {
    let link = state
        .link_service
        .inspect(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    print_link(state, &link);
    Ok(())
}

async fn create_link(state: &AppState, target: &str, code: Option<String>) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let link = state
        .link_service
        .create(target, code.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created successfully!".green().bold());
    println!();
    print_link(state, &link);

    Ok(())
}

/// Soft-deletes a link after confirmation (default: No).
///
/// Deleting an already deleted link succeeds without changes.
async fn delete_link(state: &AppState, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Link".bright_blue().bold());
    println!();

    let link = state
        .link_service
        .inspect(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

    if link.deleted {
        println!("{}", "⚠️  This link is already deleted".yellow());
        return Ok(());
    }

    print_link(state, &link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    state
        .link_service
        .remove(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!();
    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

fn print_link(state: &AppState, link: &Link) {
    let status = if link.deleted {
        "DELETED".red()
    } else {
        "ACTIVE".green()
    };
    let last_clicked = link
        .last_clicked
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("  Code:         {}", link.code.cyan());
    println!("  Short URL:    {}", state.short_url(&link.code).bright_yellow());
    println!("  Target:       {}", link.target);
    println!("  Clicks:       {}", link.clicks.to_string().bright_green());
    println!("  Last clicked: {}", last_clicked.bright_black());
    println!(
        "  Created:      {}",
        link.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!("  Status:       {}", status);
    println!();
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
        DbAction::Migrate => {
            println!("{}", "📦 Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations").run(pool).await?;

            println!("{}", "✅ Migrations up to date".green().bold());
        }
    }

    Ok(())
}
