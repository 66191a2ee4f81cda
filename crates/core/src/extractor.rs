//! Info辞書からのメタデータ抽出。
//!
//! トレーラの `/Info` 辞書の4フィールドを、アプリケーション規約に従って
//! 識別子へ読み替える。これはPDF形式の規定ではなく外部規約であるため、
//! 汎用メタデータ解析ではなく固定の対応表（`INFO_FIELD_MAP`）で表現する。

use lopdf::{Document, Object};

use crate::CoreError;

/// 間接参照をたどる最大回数。循環参照による無限ループを防ぐ。
const MAX_REFERENCE_DEPTH: usize = 8;

/// 抽出対象の識別子。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    DocumentId,
    InstitutionId,
    DocumentHash,
    SignatureReference,
}

/// Info辞書キー → 識別子の対応表。
pub const INFO_FIELD_MAP: &[(&[u8], IdentifierField)] = &[
    (b"Subject" as &[u8], IdentifierField::DocumentId),
    (b"Creator" as &[u8], IdentifierField::InstitutionId),
    (b"Keywords" as &[u8], IdentifierField::DocumentHash),
    (b"Producer" as &[u8], IdentifierField::SignatureReference),
];

/// Info辞書から取得した識別子。どのフィールドも欠落し得る。
///
/// `document_id` の欠落は「認識されない文書」を意味し、抽出失敗とは区別される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedIdentifiers {
    pub document_id: Option<String>,
    pub institution_id: Option<String>,
    pub document_hash: Option<String>,
    pub signature_reference: Option<String>,
}

impl ExtractedIdentifiers {
    fn slot(&mut self, field: IdentifierField) -> &mut Option<String> {
        match field {
            IdentifierField::DocumentId => &mut self.document_id,
            IdentifierField::InstitutionId => &mut self.institution_id,
            IdentifierField::DocumentHash => &mut self.document_hash,
            IdentifierField::SignatureReference => &mut self.signature_reference,
        }
    }
}

/// PDFのInfo辞書から識別子を抽出する。
///
/// 呼び出し元へエラーを返さない。コンテナのパースに失敗した場合や
/// パーサがパニックした場合は警告ログを出力し、すべて欠落した結果を返す。
pub fn extract(bytes: &[u8]) -> ExtractedIdentifiers {
    extract_guarded(bytes, try_extract)
}

fn extract_guarded<F>(bytes: &[u8], parse: F) -> ExtractedIdentifiers
where
    F: FnOnce(&[u8]) -> Result<ExtractedIdentifiers, CoreError> + std::panic::UnwindSafe,
{
    match std::panic::catch_unwind(|| parse(bytes)) {
        Ok(Ok(identifiers)) => identifiers,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Info辞書の抽出に失敗しました。識別子なしとして扱います");
            ExtractedIdentifiers::default()
        }
        Err(_) => {
            tracing::warn!("Info辞書の解析中にパーサがパニックしました。識別子なしとして扱います");
            ExtractedIdentifiers::default()
        }
    }
}

fn try_extract(bytes: &[u8]) -> Result<ExtractedIdentifiers, CoreError> {
    let doc = Document::load_mem(bytes).map_err(|e| CoreError::ContainerParse(e.to_string()))?;

    // Info辞書が無いのは正常系
    let Ok(info_obj) = doc.trailer.get(b"Info") else {
        tracing::debug!("トレーラにInfo辞書がありません");
        return Ok(ExtractedIdentifiers::default());
    };

    let info = resolve(&doc, info_obj)?
        .as_dict()
        .map_err(|e| CoreError::MalformedInfo(e.to_string()))?;

    let mut identifiers = ExtractedIdentifiers::default();
    for (key, field) in INFO_FIELD_MAP {
        let Ok(value) = info.get(*key) else {
            continue;
        };
        // 個々のフィールドの参照切れ・型不正はそのフィールドの欠落として扱う
        let text = match resolve(&doc, value) {
            Ok(Object::String(raw, _)) => decode_text_string(raw),
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, field = ?field, "Info辞書のフィールドを解決できません");
                continue;
            }
        };
        let text = text.trim();
        if !text.is_empty() {
            *identifiers.slot(*field) = Some(text.to_string());
        }
    }

    Ok(identifiers)
}

/// 間接参照を実体までたどる。
fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> Result<&'a Object, CoreError> {
    for _ in 0..MAX_REFERENCE_DEPTH {
        match obj {
            Object::Reference(id) => {
                obj = doc
                    .get_object(*id)
                    .map_err(|e| CoreError::ContainerParse(e.to_string()))?;
            }
            _ => return Ok(obj),
        }
    }
    Err(CoreError::ReferenceDepthExceeded(MAX_REFERENCE_DEPTH))
}

/// PDFテキスト文字列をデコードする。
///
/// BOM付きUTF-16BE / UTF-8、それ以外はPDFDocEncoding（Latin-1で近似）。
fn decode_text_string(raw: &[u8]) -> String {
    if let Some(body) = raw.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(body) = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(body).into_owned();
    }
    raw.iter().map(|&b| b as char).collect()
}
