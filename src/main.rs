use anyhow::{Context, Result};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use tracing::info;

use interior_design_ai::{
    AppState, build_router, config::AppConfig, logging, mcp_server::DesignServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init("info");

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config)
        .await
        .context("open history store")?;
    let mcp_path = config.mcp_path();

    let state_for_mcp = state.clone();
    let service = StreamableHttpService::new(
        move || Ok(DesignServer::new(state_for_mcp.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = build_router(state.clone()).nest_service(&mcp_path, service);

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("bind {bind_address}"))?;

    info!(
        address = %bind_address,
        mcp = %mcp_path,
        history = state.history.backend_name(),
        design_service = state.upstream.base_url(),
        "interior design server started"
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("server stopped");
    Ok(())
}
