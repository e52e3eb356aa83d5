use clinic_api::{app, config, db, state::AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("starting clinic API in {:?} mode", config.environment);

    // Fail loud: with no signing secret the token service refuses every
    // issue/verify, so authenticated traffic cannot be served.
    if config.security.jwt_secret.is_empty() {
        tracing::error!("JWT_SECRET is not set; all token operations will be refused");
    }

    let pool = db::connect(&config.database).await?;
    let app = app::router(AppState::new(pool));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("clinic API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
