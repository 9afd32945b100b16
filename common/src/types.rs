//! APIの型定義
//!
//! バックエンドとやり取りするJSONの形:
//! - AnalysisRecord: 保存済みの解析結果（履歴の1行）
//! - UploadResult: CSVアップロード直後の解析結果
//! - HistoryPage: 履歴のページ単位レスポンス

use std::fmt;

use serde::{Deserialize, Serialize};

/// 解析ID
///
/// バックエンドの採番形式に依存しないよう、数値と文字列の両方を受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisId {
    Number(i64),
    Text(String),
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisId::Number(n) => write!(f, "{}", n),
            AnalysisId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for AnalysisId {
    fn from(value: i64) -> Self {
        AnalysisId::Number(value)
    }
}

impl From<&str> for AnalysisId {
    fn from(value: &str) -> Self {
        AnalysisId::Text(value.to_string())
    }
}

/// 保存済みの解析レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub upload_timestamp: String,
    pub original_filename: String,

    #[serde(default)]
    pub site_name: Option<String>,

    pub avg_ph: f64,
    pub ph_category: String,
    pub avg_tds: f64,
    pub tds_category: String,

    /// 古いレコードには無い
    #[serde(default)]
    pub treatment_train: Option<String>,

    #[serde(default)]
    pub explanation: Option<String>,

    /// 実際に使った処理方法（ユーザー記入）
    #[serde(default)]
    pub user_notes: Option<String>,
}

impl AnalysisRecord {
    /// 推奨処理（処理系列と説明の両方が揃っている場合のみ）
    pub fn recommendation(&self) -> Option<(&str, &str)> {
        match (self.treatment_train.as_deref(), self.explanation.as_deref()) {
            (Some(train), Some(explanation)) if !train.is_empty() && !explanation.is_empty() => {
                Some((train, explanation))
            }
            _ => None,
        }
    }

    /// 空文字のメモは未記入扱い
    pub fn notes(&self) -> Option<&str> {
        self.user_notes.as_deref().filter(|n| !n.is_empty())
    }
}

/// 水質サマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSummary {
    pub avg_ph: f64,
    pub ph_category: String,
    pub avg_tds: f64,
    pub tds_category: String,
    pub row_count: u64,
}

/// 処理推奨
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub treatment_train: String,
    pub explanation: String,
}

/// アップロード結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub analysis_id: AnalysisId,
    pub original_filename: String,

    #[serde(default)]
    pub site_name: Option<String>,

    pub summary: WaterSummary,
    pub recommendation: Recommendation,
}

/// 履歴の1ページ分
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    pub analyses: Vec<AnalysisRecord>,
    pub total: u64,
}

/// メモ更新リクエストのボディ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotesUpdate<'a> {
    pub user_notes: &'a str,
}
