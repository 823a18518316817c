use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard::{api, config::AppConfig, db::Database, relay, state::AppState};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Kanban board server with real-time board rooms")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve {
        /// Port to listen on (overrides TASKBOARD_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind (overrides TASKBOARD_HOST)
        #[arg(long)]
        host: Option<String>,

        /// SQLite database file (overrides TASKBOARD_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Apply pending database migrations and exit
    Migrate {
        /// SQLite database file (overrides TASKBOARD_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskboard=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db = open_database(config.db_path.clone())?;
    let addr = config.bind_addr();
    tracing::info!(
        positioner = %config.positioner,
        client_relay = config.client_relay,
        "Starting taskboard server"
    );

    let state = AppState::new(db, config);
    let rooms = state.rooms.clone();
    let heartbeat = relay::start_heartbeat(rooms.clone());
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("taskboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            heartbeat.abort();
            rooms.shutdown_all().await;
        })
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { port, host, db }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if db.is_some() {
                config.db_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Migrate { db }) => {
            open_database(db.or(config.db_path))?;
            tracing::info!("Migrations applied");
        }
        None => serve(config).await?,
    }

    Ok(())
}
