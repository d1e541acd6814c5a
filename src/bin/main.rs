use std::net::SocketAddr;

use anyhow::{Result, bail};
use blog_api::auth::{TokenService, UserStore, password, token};
use blog_api::{AuthConfig, DEFAULT_BIND, DatabaseConfig, Email, ServiceConfig};
use chrono::Duration;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blog-api")]
#[command(about = "Blog service with user accounts and token authentication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "BLOG_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
        #[arg(long, env = "BLOG_DB_URL", default_value = "memory")]
        db_url: String,
        /// HMAC secret for access tokens (random per process if omitted)
        #[arg(long, env = "BLOG_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
        /// Lifetime of issued access tokens
        #[arg(
            long,
            env = "BLOG_TOKEN_TTL_MINUTES",
            default_value_t = token::DEFAULT_TOKEN_TTL_MINUTES,
            value_parser = clap::value_parser!(i64).range(1..=token::MAX_TOKEN_TTL_MINUTES)
        )]
        token_ttl_minutes: i64,
        /// bcrypt work factor for new password hashes
        #[arg(long, env = "BLOG_BCRYPT_COST", default_value_t = password::DEFAULT_COST)]
        bcrypt_cost: u32,
        /// Maximum number of concurrently open database sessions
        #[arg(long, env = "BLOG_MAX_SESSIONS", default_value_t = blog_api::db::DEFAULT_MAX_SESSIONS)]
        max_sessions: usize,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "BLOG_DB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Sign an access token for an existing user
    IssueToken {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BLOG_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,
        #[arg(
            long,
            default_value_t = token::DEFAULT_TOKEN_TTL_MINUTES,
            value_parser = clap::value_parser!(i64).range(1..=token::MAX_TOKEN_TTL_MINUTES)
        )]
        ttl_minutes: i64,
        #[arg(long, env = "BLOG_DB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            db_url,
            jwt_secret,
            token_ttl_minutes,
            bcrypt_cost,
            max_sessions,
        } => {
            let mut auth = match jwt_secret {
                Some(secret) if !secret.is_empty() => AuthConfig::with_secret(secret),
                _ => {
                    warn!("No JWT secret configured; using a random secret. Tokens will not survive a restart");
                    AuthConfig::ephemeral()
                }
            };
            auth.token_ttl_minutes = token_ttl_minutes;
            auth.bcrypt_cost = bcrypt_cost;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for HTTP server: {}", db_config.url);

            let config = ServiceConfig::new(bind, db_config, auth).with_max_sessions(max_sessions);
            let app = blog_api::create_app(&config).await?;

            let listener = tokio::net::TcpListener::bind(config.bind).await?;
            info!("Server listening on http://{}", config.bind);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("Server stopped");
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = blog_api::create_connection(db_config).await?;
            blog_api::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::IssueToken {
            email,
            jwt_secret,
            ttl_minutes,
            db_url,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = blog_api::create_connection(db_config).await?;
            blog_api::ensure_schema(&db).await?;

            let email = Email::new(email);
            let Some(user) = UserStore::new(db).find_by_email(&email).await? else {
                bail!("No user registered with email '{}'", email);
            };

            let mut extra = Map::new();
            extra.insert("user_id".to_string(), Value::from(user.id.get()));

            let tokens = TokenService::new(jwt_secret.as_bytes(), Duration::minutes(ttl_minutes));
            let access_token = tokens.issue(user.email.as_str(), extra)?;

            println!("Token for {} (user {}), valid {} minutes:", user.email, user.id, ttl_minutes);
            println!();
            println!("  {}", access_token);
            println!();
            println!("Use with: -H 'Authorization: Bearer {}'", access_token);
        }
    }

    Ok(())
}

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` emits JSON lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blog_api=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
