//! # AcadCert gate 共有型定義
//!
//! 公開レスポンス契約と外部検証機関（Verification Authority）のワイヤ形式を
//! Rust構造体として提供する。
//!
//! ## エンコーディング規則
//! - JSONフィールド名はcamelCase
//! - タイムスタンプはRFC 3339（UTC）文字列

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ステータスタグ
// ---------------------------------------------------------------------------

/// 入力不正・脅威検出時のステータスタグ（HTTP 400）
pub const STATUS_INVALID: &str = "INVALID";
/// 内部エラー時のステータスタグ（HTTP 500）
pub const STATUS_ERROR: &str = "ERROR";
/// 検証不能（未登録・機関到達不能・非対象文書）時のステータスタグ（HTTP 200）
pub const STATUS_UNKNOWN: &str = "UNKNOWN";

// ---------------------------------------------------------------------------
// 外部検証機関レスポンス
// ---------------------------------------------------------------------------

/// `GET /api/documents/{documentId}/verify-public` のレスポンス。
///
/// 認識するフィールド以外は無視する。どのフィールドも欠落・`null` であり得る。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityVerificationResponse {
    /// 文書ステータス（"ACTIVE", "REVOKED", "SUPERSEDED" 等）
    #[serde(default)]
    pub status: Option<String>,
    /// 検証機関による総合判定
    #[serde(default)]
    pub valid: Option<bool>,
    /// 個別チェック結果
    #[serde(default, deserialize_with = "null_as_default")]
    pub checks: AuthorityChecks,
    /// 発行機関情報（不透明なJSON）
    #[serde(default)]
    pub institution: Option<serde_json::Value>,
    /// 文書情報（不透明なJSON）
    #[serde(default)]
    pub document: Option<serde_json::Value>,
    /// 検証エラー一覧
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    #[serde(default)]
    pub revoked_at: Option<String>,
    /// 失効操作者（文字列またはオブジェクト。不透明なJSON）
    #[serde(default)]
    pub revoked_by: Option<serde_json::Value>,
    /// 失効理由
    #[serde(default)]
    pub reason: Option<String>,
}

/// 検証機関の個別チェック結果。欠落は `false` として扱う。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityChecks {
    #[serde(default, deserialize_with = "null_as_default")]
    pub signature_valid: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authority_valid: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_revoked: bool,
}

/// `null` をデフォルト値として読む。
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// 公開レスポンス: 検証成功 (HTTP 200)
// ---------------------------------------------------------------------------

/// 検証機関への問い合わせが成功した場合のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedResponse {
    /// 検証機関のステータスをそのまま返す
    pub status: String,
    pub valid: bool,
    /// 人間向けメッセージ
    pub message: String,
    pub document_id: String,
    pub institution_id: Option<String>,
    pub institution: Option<serde_json::Value>,
    pub document: Option<serde_json::Value>,
    pub verification: VerificationChecks,
    pub details: VerifiedDetails,
    pub verified_at: String,
    pub receipt: Receipt,
}

/// 公開レスポンス上のチェック結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChecks {
    pub cryptographic_integrity: bool,
    pub issuing_authority: bool,
    pub revocation_status: bool,
}

/// 検証成功時の補足情報。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedDetails {
    pub is_acad_cert_document: bool,
    /// Info辞書のKeywordsから取得したコンテンツハッシュ
    pub document_hash: Option<String>,
    /// Info辞書のProducerから取得した署名参照
    pub signature_reference: Option<String>,
    /// アップロードされたバイト列のSHA-256（hex）
    pub file_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

/// 1回の検証試行を記述する一時的な監査レシート。永続化されない。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// `RCP-` + UUID v4。リクエストごとに異なる
    pub id: String,
    pub document_id: String,
    pub verified_at: String,
    /// "VALID", "REVOKED", "SUPERSEDED", "INVALID", "UNKNOWN"
    pub result: String,
    pub checks: ReceiptChecks,
    pub institution: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptChecks {
    pub signature: bool,
    pub authority: bool,
    pub revocation: bool,
}

// ---------------------------------------------------------------------------
// 公開レスポンス: 拒否・エラー (HTTP 400 / 500)
// ---------------------------------------------------------------------------

/// 入力不正（400）・脅威検出（400）・内部エラー（500）のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionResponse {
    /// `STATUS_INVALID` または `STATUS_ERROR`
    pub status: String,
    pub message: String,
    pub reason: String,
    /// 検出された脅威種別（脅威検出時のみ）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub threats: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// 公開レスポンス: 検証不能 (HTTP 200)
// ---------------------------------------------------------------------------

/// 文書の状態が確定できない場合のレスポンス。
/// リクエストの不正ではないためHTTP 200で返す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownResponse {
    /// 常に `STATUS_UNKNOWN`
    pub status: String,
    /// 常に `false`
    pub valid: bool,
    pub message: String,
    /// 機械判別用の理由
    pub reason: String,
    pub details: UnknownDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownDetails {
    pub is_acad_cert_document: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document_id: Option<String>,
    /// 検証機関が返したHTTPステータス（通信失敗・タイムアウト時は無し）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub http_status: Option<u16>,
}

// ---------------------------------------------------------------------------
// サービス情報
// ---------------------------------------------------------------------------

/// `GET /.well-known/acadcert-gate-info` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub max_upload_bytes: u64,
    pub accepted_extensions: Vec<String>,
    /// スキャナが報告し得る脅威種別
    pub threat_kinds: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 認識しないフィールドや欠落フィールドがあってもパースできることを確認
    #[test]
    fn test_authority_response_lenient_parse() {
        let json = serde_json::json!({
            "status": "REVOKED",
            "valid": false,
            "checks": { "signatureValid": true },
            "revokedAt": "2024-03-01T00:00:00Z",
            "unexpected": 42
        });
        let parsed: AuthorityVerificationResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.status.as_deref(), Some("REVOKED"));
        assert_eq!(parsed.valid, Some(false));
        assert!(parsed.checks.signature_valid);
        assert!(!parsed.checks.authority_valid);
        assert!(!parsed.checks.not_revoked);
        assert_eq!(parsed.revoked_at.as_deref(), Some("2024-03-01T00:00:00Z"));
        assert!(parsed.errors.is_empty());
        assert!(parsed.institution.is_none());
    }

    /// `null` の配列・オブジェクトはデフォルト値として読むことを確認
    #[test]
    fn test_authority_response_null_fields() {
        let json = serde_json::json!({
            "status": "ACTIVE",
            "valid": true,
            "errors": null,
            "checks": null,
            "institution": null,
            "revokedAt": null
        });
        let parsed: AuthorityVerificationResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.status.as_deref(), Some("ACTIVE"));
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.checks, AuthorityChecks::default());
        assert!(parsed.institution.is_none());
        assert!(parsed.revoked_at.is_none());

        let json = serde_json::json!({
            "checks": { "signatureValid": null, "authorityValid": true }
        });
        let parsed: AuthorityVerificationResponse = serde_json::from_value(json).unwrap();
        assert!(!parsed.checks.signature_valid);
        assert!(parsed.checks.authority_valid);
    }

    /// `revokedBy` は文字列でもオブジェクトでも受け入れることを確認
    #[test]
    fn test_authority_response_revoked_by_shapes() {
        let json = serde_json::json!({
            "status": "REVOKED",
            "revokedBy": { "id": 7, "name": "Registrar" }
        });
        let parsed: AuthorityVerificationResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.revoked_by.unwrap()["name"], "Registrar");

        let json = serde_json::json!({ "revokedBy": "registrar@example.edu" });
        let parsed: AuthorityVerificationResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.revoked_by, Some(serde_json::json!("registrar@example.edu")));
    }

    /// 検証不能レスポンスがcamelCaseで出力されることを確認
    #[test]
    fn test_unknown_details_camel_case() {
        let body = UnknownResponse {
            status: STATUS_UNKNOWN.to_string(),
            valid: false,
            message: "m".to_string(),
            reason: "r".to_string(),
            details: UnknownDetails {
                is_acad_cert_document: true,
                document_id: Some("DOC-1".to_string()),
                http_status: Some(404),
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["details"]["isAcadCertDocument"], true);
        assert_eq!(value["details"]["documentId"], "DOC-1");
        assert_eq!(value["details"]["httpStatus"], 404);
    }

    /// 脅威リストが無い場合は `threats` キー自体が出力されないことを確認
    #[test]
    fn test_rejection_omits_empty_threats() {
        let body = RejectionResponse {
            status: STATUS_INVALID.to_string(),
            message: "Empty file".to_string(),
            reason: "File validation failed".to_string(),
            threats: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("threats").is_none());
    }
}
