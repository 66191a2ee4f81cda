//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 共有状態は読み取り専用で、リクエスト間で可変状態を共有しない。

use std::time::Duration;

use crate::orchestrator::Orchestrator;

/// 検証機関のデフォルトURL（ローカル開発用）
pub const DEFAULT_AUTHORITY_BASE_URL: &str = "http://localhost:8080";

/// 検証機関呼び出しのデフォルトタイムアウト（秒）
pub const DEFAULT_AUTHORITY_TIMEOUT_SECS: u64 = 5;

/// デフォルトの待ち受けアドレス
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// multipartのヘッダ・境界文字列のためにボディ上限へ上乗せする余裕（1 MiB）。
/// 上限超過の判定はフレームワークではなく構造検証に行わせる。
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Gateway設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 検証機関のベースURL（末尾の `/` は除去済み）
    pub authority_base_url: String,
    /// 検証機関呼び出しのタイムアウト
    pub authority_timeout: Duration,
    /// 待ち受けアドレス
    pub bind_addr: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            authority_base_url: DEFAULT_AUTHORITY_BASE_URL.to_string(),
            authority_timeout: Duration::from_secs(DEFAULT_AUTHORITY_TIMEOUT_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl GatewayConfig {
    /// 環境変数から構築する。
    ///
    /// - `AUTHORITY_BASE_URL`
    /// - `AUTHORITY_TIMEOUT_SECS`
    /// - `BIND_ADDR`
    pub fn from_env() -> anyhow::Result<Self> {
        let authority_base_url = match std::env::var("AUTHORITY_BASE_URL") {
            Ok(url) => url,
            Err(_) => {
                tracing::warn!(
                    default = DEFAULT_AUTHORITY_BASE_URL,
                    "AUTHORITY_BASE_URLが未設定です。デフォルトを使用します"
                );
                DEFAULT_AUTHORITY_BASE_URL.to_string()
            }
        };

        let authority_timeout_secs = match std::env::var("AUTHORITY_TIMEOUT_SECS") {
            Ok(v) => v.parse::<u64>().map_err(|e| {
                anyhow::anyhow!("AUTHORITY_TIMEOUT_SECSは正の整数である必要があります: {e}")
            })?,
            Err(_) => DEFAULT_AUTHORITY_TIMEOUT_SECS,
        };
        if authority_timeout_secs == 0 {
            anyhow::bail!("AUTHORITY_TIMEOUT_SECSは1以上である必要があります");
        }

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            authority_base_url: normalize_base_url(&authority_base_url),
            authority_timeout: Duration::from_secs(authority_timeout_secs),
            bind_addr,
        })
    }
}

/// 末尾の `/` を除去する。
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// 受け入れパイプライン
    pub orchestrator: Orchestrator,
    /// 受け付ける文書の最大サイズ（バイト）
    pub max_upload_bytes: u64,
}
