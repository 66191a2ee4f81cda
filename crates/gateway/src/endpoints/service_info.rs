//! # GET /.well-known/acadcert-gate-info
//!
//! サービス情報公開エンドポイント。

use std::sync::Arc;

use acadcert_core::{ThreatKind, ACCEPTED_EXTENSION};
use acadcert_types::ServiceInfo;
use axum::extract::State;
use axum::Json;

use crate::config::GatewayState;

/// GET /.well-known/acadcert-gate-info — サービス情報公開。
///
/// クライアントがアップロード前に受け入れ条件を確認するための静的な情報を返却する。
pub async fn handle_service_info(State(state): State<Arc<GatewayState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        max_upload_bytes: state.max_upload_bytes,
        accepted_extensions: vec![ACCEPTED_EXTENSION.to_string()],
        threat_kinds: ThreatKind::ALL.iter().map(|k| k.label().to_string()).collect(),
    })
}
