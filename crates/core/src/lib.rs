//! # AcadCert gate Core
//!
//! 信頼できないアップロード文書の受け入れパイプラインを構成する純粋関数群。
//!
//! ## 処理フロー
//! 1. 構造検証: サイズ・空・マジックナンバー・拡張子をチェックする
//! 2. 脅威スキャン: アクティブコンテンツのマーカーを検出する
//! 3. メタデータ抽出: Info辞書からアプリケーション定義の識別子を取得する
//!
//! いずれの段階も副作用を持たず、呼び出し元へエラーを送出しない。
//! 外部検証機関への問い合わせはgatewayクレートが担う。

pub mod extractor;
pub mod scanner;
pub mod validator;

pub use extractor::{extract, ExtractedIdentifiers, IdentifierField, INFO_FIELD_MAP};
pub use scanner::{MarkerScanner, ThreatKind, ThreatReport, ThreatScanner, THREAT_MARKERS};
pub use validator::{validate, validate_with_limit, ValidationError};

/// 受け付ける文書の最大サイズ（50 MiB）。
pub const MAX_DOCUMENT_BYTES: u64 = 50 * 1024 * 1024;

/// PDFのマジックナンバー。
pub const PDF_MAGIC: &[u8; 5] = b"%PDF-";

/// 受け付けるファイル拡張子（小文字、ドット付き）。
pub const ACCEPTED_EXTENSION: &str = ".pdf";

/// Coreモジュールのエラー型。
///
/// 抽出処理の内部でのみ使用し、`extract` の外へは出さない。
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// PDFコンテナのパースに失敗
    #[error("PDFコンテナのパースに失敗しました: {0}")]
    ContainerParse(String),
    /// Info辞書が辞書型ではない
    #[error("Info辞書が不正です: {0}")]
    MalformedInfo(String),
    /// 間接参照の連鎖が深すぎる（循環参照の疑い）
    #[error("間接参照の深さが上限を超えました: {0}")]
    ReferenceDepthExceeded(usize),
}

/// 1件のアップロード文書。リクエスト1件が排他的に所有し、処理後に破棄される。
#[derive(Debug, Clone)]
pub struct DocumentSubmission {
    /// 生のバイト列
    pub bytes: Vec<u8>,
    /// クライアントが申告したファイル名
    pub filename: String,
}

impl DocumentSubmission {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }
}
