//! # Gateway エラー型
//!
//! ハンドラ層で発生するエラーと、内部エラー時の汎用レスポンス。
//! 内部エラーの詳細はログにのみ出力し、レスポンスには含めない。

use acadcert_types::{RejectionResponse, STATUS_ERROR, STATUS_INVALID};
use axum::http::StatusCode;
use axum::Json;

use crate::outcome::REASON_VALIDATION_FAILED;

/// 内部エラー時の公開メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred during verification";
/// 内部エラー時の公開理由
pub const INTERNAL_ERROR_REASON: &str = "Internal server error";

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（multipartの欠落・破損）
    #[error("不正なリクエスト: {message}")]
    BadRequest {
        /// 公開メッセージ
        message: String,
        /// 公開理由
        reason: &'static str,
    },
    /// ボディ上限超過により文書を読み切れなかった
    #[error("文書がサイズ上限（{limit} バイト）を超えています")]
    PayloadTooLarge {
        /// 文書サイズ上限（バイト）
        limit: u64,
    },
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>, reason: &'static str) -> Self {
        GatewayError::BadRequest {
            message: message.into(),
            reason,
        }
    }
}

/// 内部エラーの汎用レスポンスを構築する。詳細は呼び出し側でログに出す。
pub fn internal_error_response() -> axum::response::Response {
    use axum::response::IntoResponse;

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RejectionResponse {
            status: STATUS_ERROR.to_string(),
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            reason: INTERNAL_ERROR_REASON.to_string(),
            threats: None,
        }),
    )
        .into_response()
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        match self {
            GatewayError::BadRequest { message, reason } => (
                StatusCode::BAD_REQUEST,
                Json(RejectionResponse {
                    status: STATUS_INVALID.to_string(),
                    message,
                    reason: reason.to_string(),
                    threats: None,
                }),
            )
                .into_response(),
            GatewayError::PayloadTooLarge { limit } => (
                StatusCode::BAD_REQUEST,
                Json(RejectionResponse {
                    status: STATUS_INVALID.to_string(),
                    message: format!(
                        "File too large: upload exceeds the {} MB limit",
                        limit / (1024 * 1024)
                    ),
                    reason: REASON_VALIDATION_FAILED.to_string(),
                    threats: None,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    /// 内部エラーのレスポンスは固定文言のみを返す
    #[tokio::test]
    async fn test_internal_error_response_is_generic() {
        let response = internal_error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: RejectionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, "ERROR");
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(body.reason, INTERNAL_ERROR_REASON);
        assert!(body.threats.is_none());
    }

    /// 読み切れないほど大きい文書も構造検証と同じ理由で拒否される
    #[tokio::test]
    async fn test_payload_too_large_response() {
        let response = GatewayError::PayloadTooLarge {
            limit: 50 * 1024 * 1024,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: RejectionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, "INVALID");
        assert_eq!(body.reason, "File validation failed");
        assert!(body.message.starts_with("File too large"));
        assert!(body.message.contains("50 MB"));
    }

    #[test]
    fn test_bad_request_status() {
        let response =
            GatewayError::bad_request("No document uploaded", "Missing document").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
