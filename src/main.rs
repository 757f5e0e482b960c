use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripfeed_gateway::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};

#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise debug for the gateway itself.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tripfeed_gateway=debug,tower_http=info".into());

    // Pretty output locally, JSON lines in production for the log aggregator.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Gateway starting in {:?} mode", config.env);
    tracing::info!(
        api = %config.api_base_url,
        content = %config.content_base_url,
        weather = %config.weather_base_url,
        "upstream collaborators"
    );

    // 3. Upstream clients and shared state
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::from_config(config));

    // 4. Server
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("FATAL: could not bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
