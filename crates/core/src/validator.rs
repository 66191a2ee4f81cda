//! 構造検証。
//!
//! サイズ → 空 → マジックナンバー → 拡張子の順にチェックし、
//! 最初に失敗したチェックのみを報告する。

use crate::{ACCEPTED_EXTENSION, MAX_DOCUMENT_BYTES, PDF_MAGIC};

/// 構造検証の失敗理由。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// サイズ上限超過
    #[error("File too large: {size} bytes exceeds the {} MB limit", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },
    /// 空ファイル
    #[error("Empty file")]
    Empty,
    /// マジックナンバー不一致
    #[error("Invalid file format: not a PDF document")]
    InvalidFormat,
    /// 拡張子不一致
    #[error("Invalid file extension: only .pdf files are accepted")]
    WrongExtension,
}

/// 既定の上限（`MAX_DOCUMENT_BYTES`）で構造検証を行う。
pub fn validate(bytes: &[u8], filename: &str) -> Result<(), ValidationError> {
    validate_with_limit(bytes, filename, MAX_DOCUMENT_BYTES)
}

/// 指定した上限で構造検証を行う。上限ちょうどのサイズは受け付ける。
pub fn validate_with_limit(
    bytes: &[u8],
    filename: &str,
    max_bytes: u64,
) -> Result<(), ValidationError> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(ValidationError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    if bytes.is_empty() {
        return Err(ValidationError::Empty);
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ValidationError::InvalidFormat);
    }

    if !has_accepted_extension(filename) {
        return Err(ValidationError::WrongExtension);
    }

    Ok(())
}

/// 拡張子を大文字小文字を区別せずに比較する。
fn has_accepted_extension(filename: &str) -> bool {
    let ext_len = ACCEPTED_EXTENSION.len();
    if filename.len() <= ext_len {
        return false;
    }
    filename
        .get(filename.len() - ext_len..)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &[u8] = b"%PDF-1.7\n%%EOF\n";

    #[test]
    fn test_accepts_minimal_pdf() {
        assert_eq!(validate(MINIMAL, "transcript.pdf"), Ok(()));
    }

    /// 5バイト未満の入力やマジックナンバー不一致は形式エラー
    #[test]
    fn test_invalid_format() {
        for input in [&b"%"[..], b"%P", b"%PD", b"%PDF", b"PK\x03\x04", b"%pdf-1.4", b"hello world"] {
            assert_eq!(
                validate(input, "doc.pdf"),
                Err(ValidationError::InvalidFormat),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(validate(b"", "doc.pdf"), Err(ValidationError::Empty));
        // 空チェックは拡張子チェックより先
        assert_eq!(validate(b"", "doc.txt"), Err(ValidationError::Empty));
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(validate(MINIMAL, "DIPLOMA.PDF"), Ok(()));
        assert_eq!(validate(MINIMAL, "diploma.Pdf"), Ok(()));
        assert_eq!(
            validate(MINIMAL, "diploma.pdf.exe"),
            Err(ValidationError::WrongExtension)
        );
        assert_eq!(validate(MINIMAL, "diploma"), Err(ValidationError::WrongExtension));
        assert_eq!(validate(MINIMAL, ".pdf"), Err(ValidationError::WrongExtension));
    }

    /// マジックナンバーのチェックは拡張子より先に行われる
    #[test]
    fn test_check_order_magic_before_extension() {
        assert_eq!(
            validate(b"not a pdf", "doc.txt"),
            Err(ValidationError::InvalidFormat)
        );
    }

    /// 上限ちょうどは通過し、1バイト超過で失敗する
    #[test]
    fn test_size_boundary() {
        let mut at_limit = vec![b' '; MAX_DOCUMENT_BYTES as usize];
        at_limit[..PDF_MAGIC.len()].copy_from_slice(PDF_MAGIC);
        assert_eq!(validate(&at_limit, "big.pdf"), Ok(()));

        at_limit.push(b' ');
        let err = validate(&at_limit, "big.pdf").unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: MAX_DOCUMENT_BYTES + 1,
                limit: MAX_DOCUMENT_BYTES,
            }
        );
        assert!(err.to_string().contains("50 MB"));
    }

    /// サイズチェックが最優先で、メッセージは設定された上限を反映する
    #[test]
    fn test_size_checked_first_with_custom_limit() {
        let err = validate_with_limit(b"garbage bytes", "doc.txt", 4).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { size: 13, limit: 4 }));
    }
}
