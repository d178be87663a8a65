use bookstore_catalog::{
    adapters::{file::FilePendingQueue, http::HttpNumberClient, postgres::PostgresBookStore},
    api::{handlers::AppState, router::create_router},
    application::{
        book::{BookMetrics, ServiceDependencies},
        maintenance::{MaintenanceGate, spawn_config_observer},
    },
    config::AppConfig,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 設定変更チャネルのバッファ
const CONFIG_CHANGE_BUFFER: usize = 16;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookstore_catalog=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!("Database URL: {}", config.database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let book_store = Arc::new(PostgresBookStore::new(pool.clone()));
    let number_provider = Arc::new(
        HttpNumberClient::new(&config.number_service_url, config.number_timeout)
            .expect("Failed to build number service client"),
    );
    let pending_queue = Arc::new(FilePendingQueue::new(&config.pending_dir));

    tracing::info!(
        number_service = %config.number_service_url,
        timeout_ms = config.number_timeout.as_millis() as u64,
        pending_dir = %pending_queue.dir().display(),
        "Registration dependencies ready"
    );

    // Create service dependencies
    let service_deps = ServiceDependencies {
        book_store,
        number_provider,
        pending_queue,
        metrics: Arc::new(BookMetrics::new()),
        number_timeout: config.number_timeout,
    };

    // Maintenance gate and its config change observer
    let gate = Arc::new(MaintenanceGate::new(config.app_is_open));
    let (config_changes, config_rx) = mpsc::channel(CONFIG_CHANGE_BUFFER);
    spawn_config_observer(gate.clone(), config_rx);

    tracing::info!(is_open = config.app_is_open, "Maintenance gate initialized");

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps,
        gate,
        config_changes,
    });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
