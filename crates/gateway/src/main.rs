//! # AcadCert gate Gateway
//!
//! 信頼できないアップロード文書の受け入れゲート。
//!
//! ## 役割
//! - PDFの構造検証
//! - アクティブコンテンツの脅威スキャン
//! - Info辞書からの識別子抽出
//! - 外部検証機関への問い合わせと公開レスポンスへの整形
//!
//! 署名・発行機関・失効の実検証は外部検証機関が行う。このゲートは鍵を保持しない。
//!
//! ## API エンドポイント
//! - `POST /api/verify` — multipart `document` フィールドの文書を検証
//! - `GET /.well-known/acadcert-gate-info` — サービス情報公開

mod authority;
mod config;
mod endpoints;
mod error;
mod orchestrator;
mod outcome;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use acadcert_core::{MarkerScanner, MAX_DOCUMENT_BYTES};
use axum::extract::DefaultBodyLimit;

use authority::HttpAuthorityClient;
use config::{GatewayConfig, GatewayState, MULTIPART_OVERHEAD_BYTES};
use orchestrator::Orchestrator;

/// ルーターを構築する。
pub(crate) fn app(state: Arc<GatewayState>) -> axum::Router {
    // 上限超過は構造検証で報告するため、ボディ上限は文書上限より少し大きくする
    let body_limit = state.max_upload_bytes as usize + MULTIPART_OVERHEAD_BYTES;

    axum::Router::new()
        .route("/api/verify", axum::routing::post(endpoints::handle_verify))
        .route(
            "/.well-known/acadcert-gate-info",
            axum::routing::get(endpoints::handle_service_info),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        authority_base_url = %config.authority_base_url,
        authority_timeout_secs = config.authority_timeout.as_secs(),
        "検証機関の設定"
    );

    let authority = HttpAuthorityClient::new(
        config.authority_base_url.clone(),
        config.authority_timeout,
    )?;

    let state = Arc::new(GatewayState {
        orchestrator: Orchestrator::new(Arc::new(MarkerScanner), Arc::new(authority)),
        max_upload_bytes: MAX_DOCUMENT_BYTES,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Gatewayを {} で起動します", config.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
