use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, ServerConfig, SheetConfig};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::booking::BookingStore;
use service::sheets::google::{GoogleSheetsClient, SPREADSHEETS_SCOPE};
use service::sheets::token::{ServiceAccountKey, ServiceAccountTokens};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Authenticate with the service account, open the worksheet and verify its header.
///
/// Any failure here is fatal: the process must not serve requests against a
/// sheet it could not validate.
pub async fn connect_store(sheet: &SheetConfig) -> Result<Arc<BookingStore>, StartupError> {
    common::env::ensure_file(&sheet.credentials_path)
        .await
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(sheet.request_timeout_secs))
        .build()
        .map_err(|e| StartupError::InvalidConfig(format!("http client: {e}")))?;

    let key = ServiceAccountKey::from_file(&sheet.credentials_path).await?;
    info!(client_email = %key.client_email, "service_account_loaded");
    let tokens = Arc::new(ServiceAccountTokens::new(key, vec![SPREADSHEETS_SCOPE.to_string()], http.clone()));

    let client = GoogleSheetsClient::open(
        http,
        tokens,
        &sheet.api_base,
        &sheet.spreadsheet_id,
        &sheet.worksheet,
    )
    .await?;
    let store = BookingStore::initialize(Arc::new(client)).await?;
    Ok(Arc::new(store))
}

/// Router over an already-initialized store.
pub fn build_app(bookings: Arc<BookingStore>) -> Router {
    routes::build_router(AppState { bookings }, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: connect to the sheet, build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let bookings = connect_store(&cfg.sheet).await?;
    let app = build_app(bookings);

    let addr = load_bind_addr(&cfg.server)?;
    info!(%addr, spreadsheet_id = %cfg.sheet.spreadsheet_id, worksheet = %cfg.sheet.worksheet, "starting booking server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_server_config() {
        let s = ServerConfig { host: "0.0.0.0".into(), port: 9090, worker_threads: None };
        assert_eq!(load_bind_addr(&s).unwrap().port(), 9090);
        let bad = ServerConfig { host: "not a host".into(), port: 1, worker_threads: None };
        assert!(load_bind_addr(&bad).is_err());
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        let sheet = SheetConfig {
            spreadsheet_id: "abc".into(),
            credentials_path: "/nonexistent/credentials.json".into(),
            ..SheetConfig::default()
        };
        let res = connect_store(&sheet).await;
        assert!(matches!(res, Err(StartupError::InvalidConfig(_))));
    }
}
