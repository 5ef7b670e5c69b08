use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use algocoupons::AppState;
use algocoupons::config::Config;
use algocoupons::handlers;

#[derive(Debug, Parser)]
#[command(name = "algocoupons", version, about = "Coupon marketplace API server")]
struct Args {
    /// Fill an empty fallback store with demo merchants and coupons
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config::from_env();
    if args.seed_demo {
        config.seed_demo = true;
    }
    if config.dev_mode {
        tracing::warn!("Running in dev mode");
    }

    let state = AppState::from_config(&config, None).context("failed to initialize storage")?;

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
