//! # 外部検証機関クライアント
//!
//! 署名・発行機関・失効状態の実検証は外部検証機関に委譲する。
//! 1リクエストにつき1回だけ呼び出し、リトライしない。

use acadcert_types::AuthorityVerificationResponse;
use reqwest::StatusCode;

/// 検証機関呼び出しのエラー。
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// 文書が登録されていない（HTTP 404）
    #[error("文書が検証機関に登録されていません")]
    NotFound,
    /// 404以外の非成功ステータス
    #[error("検証機関がエラーを返しました: HTTP {0}")]
    Status(u16),
    /// タイムアウト
    #[error("検証機関の呼び出しがタイムアウトしました")]
    Timeout,
    /// 接続失敗などの通信エラー
    #[error("検証機関との通信に失敗: {0}")]
    Transport(String),
    /// レスポンスのパース失敗
    #[error("検証機関レスポンスのパースに失敗: {0}")]
    Decode(String),
    /// URL構築失敗
    #[error("検証機関URLが不正です: {0}")]
    InvalidUrl(String),
}

impl AuthorityError {
    /// 検証機関が返したHTTPステータス（応答が得られた場合のみ）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AuthorityError::NotFound => Some(StatusCode::NOT_FOUND.as_u16()),
            AuthorityError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// 外部検証機関の抽象インターフェース。
#[async_trait::async_trait]
pub trait AuthorityClient: Send + Sync {
    /// 公開検証を問い合わせる。
    async fn verify_public(
        &self,
        document_id: &str,
    ) -> Result<AuthorityVerificationResponse, AuthorityError>;
}

/// HTTPによる検証機関クライアント。
///
/// `GET {base_url}/api/documents/{documentId}/verify-public`（認証なし）
pub struct HttpAuthorityClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpAuthorityClient {
    /// タイムアウト付きのHTTPクライアントで構築する。
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http_client))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    /// 問い合わせURLを構築する。documentIdはパスセグメントとしてエンコードする。
    pub fn verify_url(&self, document_id: &str) -> Result<reqwest::Url, AuthorityError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AuthorityError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| AuthorityError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "documents", document_id, "verify-public"]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn verify_public(
        &self,
        document_id: &str,
    ) -> Result<AuthorityVerificationResponse, AuthorityError> {
        let url = self.verify_url(document_id)?;

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AuthorityError::Timeout
            } else {
                AuthorityError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AuthorityError::NotFound);
        }
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }

        response.json::<AuthorityVerificationResponse>().await.map_err(|e| {
            if e.is_timeout() {
                AuthorityError::Timeout
            } else {
                AuthorityError::Decode(e.to_string())
            }
        })
    }
}
