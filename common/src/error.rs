//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 2xx以外のHTTPレスポンス
    #[error("HTTP error {status}{}", detail_suffix(.detail))]
    Http { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// サーバーが返した `detail` メッセージ（あれば）
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
