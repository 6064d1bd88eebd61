//! Finova - gadget store and bank statement search
//!
//! Runs either web service, or seeds a database.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use finova::config::{SeedTarget, StatementDbArgs, StatementsArgs, StoreArgs, StoreDbArgs};
use finova::sealing::PurchaseSealer;
use finova::web::{self, StatementState, StoreState};
use finova::{logging, APP_NAME, APP_VERSION};
use finova_store::{
    seed, GadgetStore, PostgresBackend, SimStorageBackend, StatementStore, UserStore,
};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Interval between expired-session sweeps
const SESSION_PURGE_INTERVAL_SECS: u64 = 60;

// =============================================================================
// CLI
// =============================================================================

/// Finova web services
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "Gadget store and bank statement search")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gadget store
    Store(StoreArgs),

    /// Run the bank statement API
    Statements(StatementsArgs),

    /// Create the schema and load seed data
    Seed {
        #[command(subcommand)]
        target: SeedCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SeedCommand {
    /// Seed the gadget catalog
    Store(StoreDbArgs),

    /// Seed the bank statements
    Statements(StatementDbArgs),
}

impl SeedCommand {
    fn target(&self) -> SeedTarget {
        match self {
            Self::Store(_) => SeedTarget::Store,
            Self::Statements(_) => SeedTarget::Statements,
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    tracing::info!("Finova v{}", APP_VERSION);

    match cli.command {
        Command::Store(args) => run_store(args).await,
        Command::Statements(args) => run_statements(args).await,
        Command::Seed { target } => run_seed(target).await,
    }
}

async fn run_store(args: StoreArgs) -> anyhow::Result<()> {
    let data_dir = args.data_dir();
    tracing::info!("Data directory: {}", data_dir.display());
    let sealer = Arc::new(PurchaseSealer::load_or_create(&data_dir).await?);

    let (users, gadgets) = if args.in_memory {
        tracing::info!("Using in-memory storage");
        let backend = SimStorageBackend::new();
        seed::seed_gadgets(&backend).await?;
        share(backend)
    } else {
        let backend = PostgresBackend::connect(&args.db.to_postgres_config()).await?;
        seed::seed_gadgets(&backend).await?;
        share(backend)
    };

    let state = StoreState::new(users, gadgets, sealer, args.fetch_policy());
    spawn_session_purge(&state);

    serve(&args.bind, web::store_router(state)).await
}

fn share<B>(backend: B) -> (Arc<dyn UserStore>, Arc<dyn GadgetStore>)
where
    B: UserStore + GadgetStore + 'static,
{
    let backend = Arc::new(backend);
    let users: Arc<dyn UserStore> = backend.clone();
    let gadgets: Arc<dyn GadgetStore> = backend;
    (users, gadgets)
}

async fn run_statements(args: StatementsArgs) -> anyhow::Result<()> {
    let statements: Arc<dyn StatementStore> = if args.in_memory {
        tracing::info!("Using in-memory storage");
        let backend = SimStorageBackend::new();
        seed::seed_statements(&backend).await?;
        Arc::new(backend)
    } else {
        let backend = PostgresBackend::connect(&args.db.to_postgres_config()).await?;
        seed::seed_statements(&backend).await?;
        Arc::new(backend)
    };

    serve(&args.bind, web::statements_router(StatementState::new(statements))).await
}

async fn run_seed(command: SeedCommand) -> anyhow::Result<()> {
    let config = match &command {
        SeedCommand::Store(db) => db.to_postgres_config(),
        SeedCommand::Statements(db) => db.to_postgres_config(),
    };
    let backend = PostgresBackend::connect(&config).await?;

    let inserted = match command.target() {
        SeedTarget::Store => seed::seed_gadgets(&backend).await?,
        SeedTarget::Statements => seed::seed_statements(&backend).await?,
    };
    tracing::info!(seed = ?command.target(), inserted, "Seeding finished");

    backend.close().await;
    Ok(())
}

fn spawn_session_purge(state: &StoreState) {
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired sessions");
            }
        }
    });
}

async fn serve(bind: &str, app: axum::Router) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr = bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
