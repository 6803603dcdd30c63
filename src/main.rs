// Farmboard server - discussion board plus production dashboard

use std::net::SocketAddr;
use tokio::net::TcpListener;

use farmboard::{app_state::AppState, config::Config, routes::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state (opens the pool, creates the schema)
    let app_state = AppState::new(config.clone()).await?;

    let app = create_router(app_state);

    // Start server; connect info is needed because likes key on the caller's
    // network address
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("farmboard listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
