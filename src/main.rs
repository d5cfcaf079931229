use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

mod actor;
mod app;
mod app_state;
mod config;
mod db;
mod error;
mod middleware;
mod modules;
mod scheduling;
mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let telemetry_handles = telemetry::init_telemetry(None).await?;

    let env = config::init()?.clone();
    let pool = db::init_pool().await.context("Failed to initialize database")?;

    let addr = env.server_addr();
    let app_name = env.app.name.clone();
    let app = app::create_router(app_state::AppState::new(pool, env));

    info!("{} listening on {}", app_name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    telemetry_handles.shutdown().await?;

    Ok(())
}
