//! バックエンドAPIクライアントの契約
//!
//! 実際のHTTP送信はターゲットごとに実装する（WASMでは fetch）。
//! ビューの状態機械はこのトレイト越しにのみAPIを呼ぶ。

use serde_json::Value;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::error::Result;
use crate::types::{AnalysisId, AnalysisRecord, HistoryPage, UploadResult};

/// アップロード対象のファイル
///
/// ブラウザでは `web_sys::File`、テストではダミー型が実装する。
pub trait UploadFile: Clone {
    fn file_name(&self) -> String;
}

/// 解析APIクライアント
///
/// リトライ・タイムアウト・認証は持たない。失敗はそのまま呼び出し元に返す。
#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    type File: UploadFile;

    /// CSVをアップロードして解析結果を受け取る
    ///
    /// `site_name` は空でない場合のみ送信する。
    async fn upload_csv(&self, file: &Self::File, site_name: Option<&str>) -> Result<UploadResult>;

    /// 履歴を1ページ分取得
    async fn get_analysis_history(&self, limit: u32, offset: u64) -> Result<HistoryPage>;

    /// 最新の履歴を既定件数（20件）取得
    async fn get_recent_history(&self) -> Result<HistoryPage> {
        self.get_analysis_history(DEFAULT_HISTORY_LIMIT, 0).await
    }

    /// IDで1件取得
    async fn get_analysis_by_id(&self, id: &AnalysisId) -> Result<AnalysisRecord>;

    /// メモを更新し、更新後のレコードを受け取る
    async fn update_analysis_notes(&self, id: &AnalysisId, notes: &str) -> Result<AnalysisRecord>;
}

/// エラーレスポンスのボディから `detail` を取り出す
///
/// 対応する形:
/// 1. `{"detail": "..."}`
/// 2. `{"detail": [{"msg": "..."}, ...]}`（バリデーションエラー、"; " で連結）
///
/// # Examples
/// ```
/// use water_clean_common::api::parse_error_detail;
///
/// let body = r#"{"detail": "Invalid CSV format"}"#;
/// assert_eq!(parse_error_detail(body).as_deref(), Some("Invalid CSV format"));
/// assert_eq!(parse_error_detail("<html>502</html>"), None);
/// ```
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
