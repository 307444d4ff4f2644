use std::error::Error;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use notebox::{
    AppState,
    auth::SessionManager,
    config::Config,
    create_router,
    database::{self, MemoryStore, NoteRepository, NoteStore, UserRepository, UserStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let sessions = SessionManager::new(&config.jwt_secret)?;

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let (users, notes): (Arc<dyn UserStore>, Arc<dyn NoteStore>) = match &config.database_url {
        Some(url) => {
            let pool =
                database::repositories::connect(url, config.database_max_connections).await?;
            database::repositories::run_migrations(&pool).await?;
            tracing::info!("Connected to Postgres and applied migrations");
            (
                Arc::new(UserRepository::new(pool.clone())),
                Arc::new(NoteRepository::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, notes are kept in memory only");
            let store = MemoryStore::new();
            (Arc::new(store.clone()), Arc::new(store))
        }
    };

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );

    let state = AppState::new(users, notes, sessions, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
