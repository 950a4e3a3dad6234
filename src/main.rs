use nexdrive_rental::{
    adapters::memory::{MemoryBookingStore, MemoryCarInventory},
    adapters::postgres::{PostgresBookingStore, PostgresCarInventory},
    api::{cors_layer, create_router, handlers::AppState},
    application::rental::ServiceDependencies,
    config::{AppConfig, StoreBackend},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexdrive_rental=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize adapters
    let service_deps = match config.store_backend {
        StoreBackend::Postgres => connect_postgres(&config).await?,
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            ServiceDependencies {
                car_inventory: Arc::new(MemoryCarInventory::new()),
                booking_store: Arc::new(MemoryBookingStore::new()),
            }
        }
    };

    if config.auth.is_none() {
        tracing::info!("JWT_SECRET not set; cookie authorization disabled");
    }

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        auth: config.auth.clone(),
    });

    // Create router
    let app = create_router(app_state).layer(cors_layer(&config.allowed_origins)?);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;
    Ok(())
}

/// Connects to PostgreSQL and applies the bundled migrations
///
/// Any failure aborts startup instead of serving requests without a store.
async fn connect_postgres(config: &AppConfig) -> Result<ServiceDependencies, BoxError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .inspect_err(|e| tracing::error!("Failed to connect to database: {}", e))?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected and migrations applied");

    Ok(ServiceDependencies {
        car_inventory: Arc::new(PostgresCarInventory::new(pool.clone())),
        booking_store: Arc::new(PostgresBookingStore::new(pool)),
    })
}
