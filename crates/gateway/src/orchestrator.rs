//! # 検証オーケストレータ
//!
//! 構造検証 → 脅威スキャン → メタデータ抽出 → 検証機関呼び出し → 結果合成
//! を直列に実行する。各段階は失敗時に終端状態を返して以降の段階を実行しない。
//!
//! 内部障害を `InternalError` へ変換するのはこのモジュールだけである。

use std::sync::Arc;

use acadcert_core::{extract, validate, DocumentSubmission, ExtractedIdentifiers, ThreatScanner};
use sha2::{Digest, Sha256};

use crate::authority::{AuthorityClient, AuthorityError};
use crate::outcome::{build_verified_response, VerificationOutcome};

/// 検証機関呼び出し前の段階を通過した文書。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenedDocument {
    pub identifiers: ExtractedIdentifiers,
    /// アップロードされたバイト列のSHA-256（hex）
    pub file_sha256: String,
}

/// 構造検証・脅威スキャン・メタデータ抽出を左から順に合成する。
///
/// 抽出は構造検証と脅威スキャンの両方を通過した場合にのみ実行される。
pub fn screen(
    submission: &DocumentSubmission,
    scanner: &dyn ThreatScanner,
) -> Result<ScreenedDocument, VerificationOutcome> {
    validate(&submission.bytes, &submission.filename)
        .map_err(VerificationOutcome::ValidationFailed)?;

    let report = scanner.scan(&submission.bytes);
    if !report.is_safe() {
        return Err(VerificationOutcome::SecurityFailed(report));
    }

    Ok(ScreenedDocument {
        identifiers: extract(&submission.bytes),
        file_sha256: hex::encode(Sha256::digest(&submission.bytes)),
    })
}

/// 受け入れパイプライン。リクエスト間で可変状態を持たない。
pub struct Orchestrator {
    scanner: Arc<dyn ThreatScanner>,
    authority: Arc<dyn AuthorityClient>,
}

impl Orchestrator {
    pub fn new(scanner: Arc<dyn ThreatScanner>, authority: Arc<dyn AuthorityClient>) -> Self {
        Self { scanner, authority }
    }

    /// 1件の文書を検証し、終端状態を返す。
    pub async fn verify(&self, submission: DocumentSubmission) -> VerificationOutcome {
        let filename = submission.filename.clone();
        let size = submission.bytes.len();

        // パース処理はCPUバウンドのためブロッキングプールで実行する。
        // パニックはJoinErrorとして回収される。
        let scanner = Arc::clone(&self.scanner);
        let screened =
            tokio::task::spawn_blocking(move || screen(&submission, scanner.as_ref())).await;

        let screened = match screened {
            Ok(Ok(screened)) => screened,
            Ok(Err(outcome)) => {
                tracing::info!(
                    outcome = outcome.tag(),
                    filename = %filename,
                    size,
                    "文書を拒否しました"
                );
                return outcome;
            }
            Err(e) => {
                tracing::error!(error = %e, filename = %filename, "受け入れ処理が異常終了しました");
                return VerificationOutcome::InternalError;
            }
        };

        let Some(document_id) = screened.identifiers.document_id.clone() else {
            tracing::info!(
                outcome = "NOT_A_CREDENTIAL",
                filename = %filename,
                file_sha256 = %screened.file_sha256,
                "Info辞書にdocumentIdがありません"
            );
            return VerificationOutcome::NotACredential;
        };

        let outcome = match self.authority.verify_public(&document_id).await {
            Ok(response) => VerificationOutcome::Verified(Box::new(build_verified_response(
                document_id.clone(),
                screened.identifiers,
                screened.file_sha256,
                response,
                chrono::Utc::now(),
            ))),
            Err(AuthorityError::NotFound) => VerificationOutcome::DocumentNotFound {
                document_id: document_id.clone(),
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    document_id = %document_id,
                    "検証機関の呼び出しに失敗しました"
                );
                VerificationOutcome::AuthorityUnavailable {
                    document_id: document_id.clone(),
                    http_status: e.http_status(),
                }
            }
        };

        tracing::info!(
            outcome = outcome.tag(),
            filename = %filename,
            document_id = %document_id,
            "検証が完了しました"
        );
        outcome
    }
}
