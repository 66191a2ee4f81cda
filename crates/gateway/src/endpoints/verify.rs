//! # POST /api/verify
//!
//! multipartでアップロードされた文書を受け入れパイプラインに渡し、
//! 終端状態を公開レスポンスとして返す。

use std::sync::Arc;

use acadcert_core::DocumentSubmission;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::outcome::VerificationOutcome;

/// 文書を格納するmultipartフィールド名
pub const DOCUMENT_FIELD: &str = "document";

/// multipart不備時の公開理由
pub const REASON_MISSING_DOCUMENT: &str = "No document uploaded";

/// POST /api/verify — アップロード文書の検証。
pub async fn handle_verify(
    State(state): State<Arc<GatewayState>>,
    multipart: Multipart,
) -> Result<VerificationOutcome, GatewayError> {
    let submission = read_submission(multipart, state.max_upload_bytes).await?;
    Ok(state.orchestrator.verify(submission).await)
}

/// `document` フィールドを読み取る。他のフィールドは無視する。
async fn read_submission(
    mut multipart: Multipart,
    limit: u64,
) -> Result<DocumentSubmission, GatewayError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body", limit))?
    {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read uploaded document", limit))?;

        return Ok(DocumentSubmission::new(bytes.to_vec(), filename));
    }

    Err(GatewayError::bad_request(
        format!("Expected a file in the '{DOCUMENT_FIELD}' field"),
        REASON_MISSING_DOCUMENT,
    ))
}

/// multipart読み取りエラーを公開エラーへ変換する。フレームワークの文言は返さない。
fn multipart_error(e: MultipartError, message: &str, limit: u64) -> GatewayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::info!(limit, "ボディ上限を超えたアップロードを拒否しました");
        return GatewayError::PayloadTooLarge { limit };
    }
    tracing::debug!(error = %e.body_text(), "multipartの読み取りに失敗しました");
    GatewayError::bad_request(message, REASON_MISSING_DOCUMENT)
}
