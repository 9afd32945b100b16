//! APIの接続設定

use crate::error::{Error, Result};
use crate::types::AnalysisId;

/// 既定のバックエンドURL
pub const DEFAULT_API_BASE_URL: &str = "https://datacenter-water-clean-backend.onrender.com";

/// ビルド時に埋め込むバックエンドURLの環境変数名
pub const API_URL_ENV: &str = "WATER_CLEAN_API_URL";

/// 履歴取得の既定件数
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

const API_PREFIX: &str = "/api/v1/analysis";

/// API接続設定
///
/// すべてのリクエストはこの設定のベースURLを共有する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// ベースURLを指定して作成
    ///
    /// 末尾のスラッシュは取り除く。http(s)以外はエラー。
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "API URL must start with http:// or https://: {}",
                base_url
            )));
        }
        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    /// ビルド時の環境変数から作成
    ///
    /// ブラウザにはプロセス環境が無いので `option_env!` で埋め込んだ値を使う。
    /// 未設定・空・不正な値の場合は既定URLに戻す。
    pub fn from_env() -> Self {
        Self::from_env_value(option_env!("WATER_CLEAN_API_URL"))
    }

    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(url) => Self::new(url).unwrap_or_else(|e| {
                log::warn!("{} is invalid, falling back to default: {}", API_URL_ENV, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/v1/analysis/upload
    pub fn upload_url(&self) -> String {
        format!("{}{}/upload", self.base_url, API_PREFIX)
    }

    /// GET /api/v1/analysis/history?limit=..&offset=..
    pub fn history_url(&self, limit: u32, offset: u64) -> String {
        format!(
            "{}{}/history?limit={}&offset={}",
            self.base_url, API_PREFIX, limit, offset
        )
    }

    /// GET /api/v1/analysis/{id}
    pub fn analysis_url(&self, id: &AnalysisId) -> String {
        format!("{}{}/{}", self.base_url, API_PREFIX, id)
    }

    /// PATCH /api/v1/analysis/{id}/notes
    pub fn notes_url(&self, id: &AnalysisId) -> String {
        format!("{}{}/{}/notes", self.base_url, API_PREFIX, id)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}
