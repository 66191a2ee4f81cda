//! # 検証結果
//!
//! パイプラインの終端状態を1つのタグ付き列挙で表し、公開レスポンス契約へ変換する。
//!
//! | 状態 | HTTP | status |
//! |---|---|---|
//! | `ValidationFailed` | 400 | INVALID |
//! | `SecurityFailed` | 400 | INVALID |
//! | `NotACredential` | 200 | UNKNOWN |
//! | `DocumentNotFound` | 200 | UNKNOWN |
//! | `AuthorityUnavailable` | 200 | UNKNOWN |
//! | `Verified` | 200 | 検証機関のstatus |
//! | `InternalError` | 500 | ERROR |

use acadcert_core::{ExtractedIdentifiers, ThreatReport, ValidationError};
use acadcert_types::*;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::internal_error_response;

/// 構造検証失敗時の理由
pub const REASON_VALIDATION_FAILED: &str = "File validation failed";
/// 脅威検出時の理由
pub const REASON_SECURITY_FAILED: &str = "Security check failed";
/// 非対象文書の理由
pub const REASON_NOT_A_CREDENTIAL: &str = "Not an AcadCert document";
/// 未登録文書の理由
pub const REASON_DOCUMENT_NOT_FOUND: &str = "Document ID not recognized";
/// 検証機関到達不能の理由
pub const REASON_AUTHORITY_UNAVAILABLE: &str = "Verification service unavailable";

/// 受け入れパイプラインの終端状態。
#[derive(Debug)]
pub enum VerificationOutcome {
    /// 構造検証に失敗
    ValidationFailed(ValidationError),
    /// 脅威を検出
    SecurityFailed(ThreatReport),
    /// Info辞書にdocumentIdが無い
    NotACredential,
    /// 検証機関が404を返した
    DocumentNotFound { document_id: String },
    /// 検証機関の呼び出し失敗、または404以外の非成功ステータス
    AuthorityUnavailable {
        document_id: String,
        http_status: Option<u16>,
    },
    /// 検証機関から回答を得た
    Verified(Box<VerifiedResponse>),
    /// 予期しない内部エラー
    InternalError,
}

impl VerificationOutcome {
    /// ログ出力用の状態名
    pub fn tag(&self) -> &'static str {
        match self {
            VerificationOutcome::ValidationFailed(_) => "VALIDATION_FAILED",
            VerificationOutcome::SecurityFailed(_) => "SECURITY_FAILED",
            VerificationOutcome::NotACredential => "NOT_A_CREDENTIAL",
            VerificationOutcome::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            VerificationOutcome::AuthorityUnavailable { .. } => "AUTHORITY_UNAVAILABLE",
            VerificationOutcome::Verified(_) => "VERIFIED",
            VerificationOutcome::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl axum::response::IntoResponse for VerificationOutcome {
    fn into_response(self) -> axum::response::Response {
        match self {
            VerificationOutcome::ValidationFailed(err) => (
                StatusCode::BAD_REQUEST,
                Json(RejectionResponse {
                    status: STATUS_INVALID.to_string(),
                    message: err.to_string(),
                    reason: REASON_VALIDATION_FAILED.to_string(),
                    threats: None,
                }),
            )
                .into_response(),
            VerificationOutcome::SecurityFailed(report) => (
                StatusCode::BAD_REQUEST,
                Json(RejectionResponse {
                    status: STATUS_INVALID.to_string(),
                    message: "Document contains potentially malicious content".to_string(),
                    reason: REASON_SECURITY_FAILED.to_string(),
                    threats: Some(report.labels()),
                }),
            )
                .into_response(),
            VerificationOutcome::NotACredential => unknown(
                "This PDF is not a recognized AcadCert credential document",
                REASON_NOT_A_CREDENTIAL,
                UnknownDetails {
                    is_acad_cert_document: false,
                    document_id: None,
                    http_status: None,
                },
            ),
            VerificationOutcome::DocumentNotFound { document_id } => unknown(
                "Document not found in the verification registry",
                REASON_DOCUMENT_NOT_FOUND,
                UnknownDetails {
                    is_acad_cert_document: true,
                    document_id: Some(document_id),
                    http_status: Some(StatusCode::NOT_FOUND.as_u16()),
                },
            ),
            VerificationOutcome::AuthorityUnavailable {
                document_id,
                http_status,
            } => unknown(
                "The verification authority could not be reached; please try again later",
                REASON_AUTHORITY_UNAVAILABLE,
                UnknownDetails {
                    is_acad_cert_document: true,
                    document_id: Some(document_id),
                    http_status,
                },
            ),
            VerificationOutcome::Verified(body) => (StatusCode::OK, Json(*body)).into_response(),
            VerificationOutcome::InternalError => internal_error_response(),
        }
    }
}

fn unknown(message: &str, reason: &str, details: UnknownDetails) -> axum::response::Response {
    use axum::response::IntoResponse;

    (
        StatusCode::OK,
        Json(UnknownResponse {
            status: STATUS_UNKNOWN.to_string(),
            valid: false,
            message: message.to_string(),
            reason: reason.to_string(),
            details,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// 検証機関レスポンスからの合成
// ---------------------------------------------------------------------------

/// 検証機関の判定を分類したもの。メッセージとレシートの両方に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityVerdict {
    Valid,
    Revoked,
    Superseded,
    Invalid,
    Undetermined,
}

impl AuthorityVerdict {
    /// 優先順位: 有効 → 失効 → 差し替え → エラー付き無効 → 判定不能
    pub fn classify(response: &AuthorityVerificationResponse) -> Self {
        let status = response.status.as_deref().unwrap_or_default();
        let valid = response.valid.unwrap_or(false);

        if status.eq_ignore_ascii_case("ACTIVE") && valid {
            AuthorityVerdict::Valid
        } else if status.eq_ignore_ascii_case("REVOKED") {
            AuthorityVerdict::Revoked
        } else if status.eq_ignore_ascii_case("SUPERSEDED") {
            AuthorityVerdict::Superseded
        } else if !valid && !response.errors.is_empty() {
            AuthorityVerdict::Invalid
        } else {
            AuthorityVerdict::Undetermined
        }
    }

    /// レシートの `result`
    pub fn receipt_result(self) -> &'static str {
        match self {
            AuthorityVerdict::Valid => "VALID",
            AuthorityVerdict::Revoked => "REVOKED",
            AuthorityVerdict::Superseded => "SUPERSEDED",
            AuthorityVerdict::Invalid => "INVALID",
            AuthorityVerdict::Undetermined => "UNKNOWN",
        }
    }
}

/// 人間向けメッセージを合成する。
pub fn synthesize_message(response: &AuthorityVerificationResponse) -> String {
    match AuthorityVerdict::classify(response) {
        AuthorityVerdict::Valid => {
            "Valid Document: authentic credential issued by a verified institution".to_string()
        }
        AuthorityVerdict::Revoked => match response.reason.as_deref() {
            Some(reason) => format!("Document Revoked: {reason}"),
            None => "Document Revoked: this credential has been revoked by its issuer".to_string(),
        },
        AuthorityVerdict::Superseded => {
            "Document Superseded: a newer version of this credential has been issued".to_string()
        }
        AuthorityVerdict::Invalid => {
            // classifyがerrorsの非空を保証している
            let first = response.errors.first().map(String::as_str).unwrap_or_default();
            format!("Invalid Document: {first}")
        }
        AuthorityVerdict::Undetermined => "Document status could not be determined".to_string(),
    }
}

/// 検証成功レスポンスを組み立てる。レシートはここでのみ生成される。
pub fn build_verified_response(
    document_id: String,
    identifiers: ExtractedIdentifiers,
    file_sha256: String,
    authority: AuthorityVerificationResponse,
    verified_at: DateTime<Utc>,
) -> VerifiedResponse {
    let verdict = AuthorityVerdict::classify(&authority);
    let message = synthesize_message(&authority);
    let verified_at = verified_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let checks = authority.checks;

    let receipt = Receipt {
        id: format!("RCP-{}", uuid::Uuid::new_v4()),
        document_id: document_id.clone(),
        verified_at: verified_at.clone(),
        result: verdict.receipt_result().to_string(),
        checks: ReceiptChecks {
            signature: checks.signature_valid,
            authority: checks.authority_valid,
            revocation: checks.not_revoked,
        },
        institution: json_str(authority.institution.as_ref(), &["name"]),
        document_type: json_str(authority.document.as_ref(), &["documentType", "type"]),
    };

    VerifiedResponse {
        status: authority
            .status
            .unwrap_or_else(|| STATUS_UNKNOWN.to_string()),
        valid: authority.valid.unwrap_or(false),
        message,
        document_id,
        institution_id: identifiers.institution_id,
        institution: authority.institution,
        document: authority.document,
        verification: VerificationChecks {
            cryptographic_integrity: checks.signature_valid,
            issuing_authority: checks.authority_valid,
            revocation_status: checks.not_revoked,
        },
        details: VerifiedDetails {
            is_acad_cert_document: true,
            document_hash: identifiers.document_hash,
            signature_reference: identifiers.signature_reference,
            file_sha256,
            revoked_at: authority.revoked_at,
            revoked_by: authority.revoked_by,
            revocation_reason: authority.reason,
            errors: authority.errors,
        },
        verified_at,
        receipt,
    }
}

/// JSONオブジェクトから最初に見つかった文字列フィールドを取り出す。
fn json_str(value: Option<&serde_json::Value>, keys: &[&str]) -> Option<String> {
    let value = value?;
    keys.iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()))
        .map(str::to_string)
}
