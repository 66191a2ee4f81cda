//! 脅威スキャン。
//!
//! 生のバイト列をテキストとして（不正なバイトは置換して）デコードし、
//! アクティブコンテンツを示すマーカーを大文字小文字を区別せずに検索する。
//! マーカーの直後に英数字が続く場合は別の名前の一部とみなし、一致としない
//! （サブセットフォント名 `/AAAAAA+DejaVuSans` を `/AA` と誤認しないため）。
//!
//! ## 既知の限界
//! オブジェクトグラフを解釈しないヒューリスティックであり、偽陰性があり得る。
//! - 名前エスケープによる難読化（`/J#61vaScript` 等）
//! - 圧縮ストリーム内のトークン
//! - ストリーム境界をまたいで分割されたトークン
//!
//! 文字列リテラルやテキスト中に現れたマーカー文字列も一致するため、偽陽性もあり得る。
//!
//! より厳密なスキャナは `ThreatScanner` を実装して差し替える。

use std::fmt;

/// 検出される脅威種別。閉じた列挙。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatKind {
    JavaScript,
    AutoAction,
    LaunchAction,
    FormSubmission,
}

impl ThreatKind {
    /// 全種別（報告順）
    pub const ALL: [ThreatKind; 4] = [
        ThreatKind::JavaScript,
        ThreatKind::AutoAction,
        ThreatKind::LaunchAction,
        ThreatKind::FormSubmission,
    ];

    /// 公開レスポンスに載せるラベル
    pub fn label(self) -> &'static str {
        match self {
            ThreatKind::JavaScript => "JavaScript detected",
            ThreatKind::AutoAction => "Auto-action detected",
            ThreatKind::LaunchAction => "Launch action detected",
            ThreatKind::FormSubmission => "Form submission detected",
        }
    }
}

impl fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// マーカー → 脅威種別の対応表（小文字で比較する）。
pub const THREAT_MARKERS: &[(&str, ThreatKind)] = &[
    ("/javascript", ThreatKind::JavaScript),
    ("/aa", ThreatKind::AutoAction),
    ("/openaction", ThreatKind::AutoAction),
    ("/launch", ThreatKind::LaunchAction),
    ("/submitform", ThreatKind::FormSubmission),
];

/// スキャン結果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatReport {
    /// 検出された脅威種別（重複なし、`ThreatKind::ALL` の順）
    pub threats: Vec<ThreatKind>,
}

impl ThreatReport {
    pub fn is_safe(&self) -> bool {
        self.threats.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.threats.iter().map(|t| t.label().to_string()).collect()
    }
}

/// 脅威スキャナの抽象インターフェース。
pub trait ThreatScanner: Send + Sync {
    fn scan(&self, bytes: &[u8]) -> ThreatReport;
}

/// マーカー部分一致によるヒューリスティックスキャナ。
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScanner;

impl ThreatScanner for MarkerScanner {
    fn scan(&self, bytes: &[u8]) -> ThreatReport {
        let text = String::from_utf8_lossy(bytes).to_ascii_lowercase();

        // 全マーカーを個別に検査する（短絡しない）
        let mut threats = Vec::new();
        for (marker, kind) in THREAT_MARKERS {
            if contains_name(&text, marker) && !threats.contains(kind) {
                threats.push(*kind);
            }
        }

        ThreatReport { threats }
    }
}

/// `marker` が名前トークンとして現れるか。直後が英数字なら別の名前の一部。
fn contains_name(text: &str, marker: &str) -> bool {
    text.match_indices(marker).any(|(start, _)| {
        text.as_bytes()
            .get(start + marker.len())
            .map_or(true, |next| !next.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(bytes: &[u8]) -> ThreatReport {
        MarkerScanner.scan(bytes)
    }

    #[test]
    fn test_clean_document_is_safe() {
        let report = scan(b"%PDF-1.7\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n%%EOF");
        assert!(report.is_safe());
        assert!(report.threats.is_empty());
    }

    /// 各マーカー単独で、その種別のみが報告される
    #[test]
    fn test_each_marker_in_isolation() {
        let cases: &[(&[u8], ThreatKind)] = &[
            (&b"<< /S /JavaScript /JS (app.alert(1)) >>"[..], ThreatKind::JavaScript),
            (&b"<< /AA << /O 5 0 R >> >>"[..], ThreatKind::AutoAction),
            (&b"<< /OpenAction 7 0 R >>"[..], ThreatKind::AutoAction),
            (&b"<< /S /Launch /F (cmd.exe) >>"[..], ThreatKind::LaunchAction),
            (&b"<< /S /SubmitForm /F (http://x) >>"[..], ThreatKind::FormSubmission),
        ];
        for (input, expected) in cases {
            let report = scan(input);
            assert!(!report.is_safe());
            assert_eq!(report.threats, vec![*expected], "input: {input:?}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        let report = scan(b"<< /s /jAvAsCrIpT >>");
        assert_eq!(report.threats, vec![ThreatKind::JavaScript]);
    }

    /// 複数マーカーはすべて収集され、同種は1回のみ報告される
    #[test]
    fn test_collects_all_matches() {
        let report = scan(b"/OpenAction 3 0 R /AA << >> /Launch /JavaScript /SubmitForm");
        assert_eq!(
            report.threats,
            vec![
                ThreatKind::JavaScript,
                ThreatKind::AutoAction,
                ThreatKind::LaunchAction,
                ThreatKind::FormSubmission,
            ]
        );
        assert_eq!(
            report.labels(),
            vec![
                "JavaScript detected",
                "Auto-action detected",
                "Launch action detected",
                "Form submission detected",
            ]
        );
    }

    /// 不正なUTF-8が混在してもマーカーは検出される
    #[test]
    fn test_tolerates_invalid_utf8() {
        let mut input = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        input.extend_from_slice(b"\xFF\xFE/Launch\xC0");
        assert_eq!(scan(&input).threats, vec![ThreatKind::LaunchAction]);
    }

    /// サブセットフォント名など、マーカーで始まる別の名前は一致しない
    #[test]
    fn test_longer_names_are_not_markers() {
        let report = scan(
            b"<< /Type /Font /BaseFont /AAAAAA+DejaVuSans /FontName /AABBCC+Arial >>",
        );
        assert!(report.is_safe(), "got {:?}", report.threats);
        assert!(scan(b"<< /LaunchPad 1 >>").is_safe());
    }

    /// 区切り文字や入力末尾で終わるマーカーは検出される
    #[test]
    fn test_marker_followed_by_delimiter() {
        assert_eq!(scan(b"<</AA<</O 5 0 R>>>>").threats, vec![ThreatKind::AutoAction]);
        assert_eq!(scan(b"/Subtype /Widget /AA").threats, vec![ThreatKind::AutoAction]);
        assert_eq!(scan(b"/AAAAAA+Font /AA 3 0 R").threats, vec![ThreatKind::AutoAction]);
    }

    /// 名前エスケープによる難読化は検出できない（既知の限界）
    #[test]
    fn test_escaped_name_is_not_detected() {
        assert!(scan(b"<< /S /J#61vaScript >>").is_safe());
    }
}
