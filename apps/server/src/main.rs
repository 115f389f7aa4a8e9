use anyhow::Context;
use clap::{Parser, Subcommand};
use clubhouse_config::load as load_config;
use clubhouse_gateway::{create_router, GatewayState};
use clubhouse_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "clubhouse-backend")]
#[command(about = "Clubhouse community chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Seed the database with demo users and chat spaces
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Seed => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Clubhouse backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool.clone());
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(clubhouse_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("seeding database with demo data");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let now = chrono::Utc::now().to_rfc3339();

    for (id, username, display_name) in [(1i64, "alice", "Alice"), (2i64, "bob", "Bob")] {
        sqlx::query(
            "INSERT OR IGNORE INTO users (id, username, display_name, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(username)
        .bind(display_name)
        .bind(&now)
        .execute(&services.db_pool)
        .await
        .with_context(|| format!("failed to insert demo user {username}"))?;
    }

    for (id, name, description, is_private) in [
        (1i64, "General", "Open space for every member", false),
        (2i64, "Members Lounge", "Private space for paying members", true),
    ] {
        sqlx::query(
            "INSERT OR IGNORE INTO chat_spaces (id, name, description, is_private, created_by_id, created_at)
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_private)
        .bind(&now)
        .execute(&services.db_pool)
        .await
        .with_context(|| format!("failed to insert demo chat space {name}"))?;
    }

    sqlx::query(
        "INSERT OR IGNORE INTO chat_space_memberships (chat_space_id, user_id, is_admin, joined_at)
         VALUES (2, 1, 1, ?)",
    )
    .bind(&now)
    .execute(&services.db_pool)
    .await
    .context("failed to insert demo membership")?;

    println!("Database seeded with demo data:");
    println!("- 2 users (alice, bob)");
    println!("- 2 chat spaces (General, Members Lounge)");
    println!("- alice is a member of the private lounge");

    Ok(())
}
