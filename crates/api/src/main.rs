use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use gurmania_api::config::ServerConfig;
use gurmania_api::router::build_app_router;
use gurmania_api::state::AppState;
use gurmania_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "gurmania_api=debug,gurmania_db=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        gating_policy = config.gating_policy.as_str(),
        join_grace_mins = config.workshop_join_grace_mins,
        "Configuration loaded"
    );

    let pool = prepare_database().await;
    let app = build_app_router(
        AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
        },
        &config,
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Gurmania API listening");

    serve_until_shutdown(listener, app, Duration::from_secs(config.shutdown_timeout_secs)).await;

    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` wins over [`DEFAULT_LOG_FILTER`]; `LOG_FORMAT=json` switches
/// to structured output for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, ping, and migrate. Any failure aborts startup.
async fn prepare_database() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gurmania_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    gurmania_db::health_check(&pool)
        .await
        .expect("Database did not answer the startup ping");
    gurmania_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready");
    pool
}

/// Serve until a signal arrives, then give in-flight requests at most
/// `drain_limit` to finish.
async fn serve_until_shutdown(
    listener: tokio::net::TcpListener,
    app: axum::Router,
    drain_limit: Duration,
) {
    let signalled = Arc::new(Notify::new());
    let notifier = Arc::clone(&signalled);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            notifier.notify_one();
        })
        .into_future();

    let deadline = async {
        signalled.notified().await;
        tokio::time::sleep(drain_limit).await;
    };

    tokio::select! {
        result = server => {
            result.expect("Server error");
            tracing::info!("In-flight requests drained");
        }
        () = deadline => {
            tracing::warn!(
                drain_secs = drain_limit.as_secs(),
                "Drain limit reached with requests still in flight"
            );
        }
    }
}

/// SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
