//! アップロード画面の状態
//!
//! ファイル選択 → 送信開始 → 結果反映 の遷移を持つ。
//! HTTP送信そのものは呼び出し側が `AnalysisApi` で行う。

use crate::api::UploadFile;
use crate::error::Error;
use crate::types::UploadResult;

pub const INVALID_FILE_MESSAGE: &str = "Please select a valid CSV file";
pub const MISSING_FILE_MESSAGE: &str = "Please select a file";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file. Please try again.";

/// CSVとして受け付けるファイル名か（拡張子のみで判定）
pub fn is_csv_name(name: &str) -> bool {
    name.ends_with(".csv")
}

/// 送信するリクエスト内容
#[derive(Debug, Clone)]
pub struct UploadRequest<F> {
    pub file: F,
    pub site_name: Option<String>,
}

/// アップロードフォームの状態
#[derive(Debug, Clone)]
pub struct UploadForm<F> {
    file: Option<F>,
    site_name: String,
    loading: bool,
    error: Option<String>,
    result: Option<UploadResult>,
}

impl<F> Default for UploadForm<F> {
    fn default() -> Self {
        Self {
            file: None,
            site_name: String::new(),
            loading: false,
            error: None,
            result: None,
        }
    }
}

impl<F: UploadFile> UploadForm<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&F> {
        self.file.as_ref()
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&UploadResult> {
        self.result.as_ref()
    }

    /// 送信ボタンを押せるか
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.loading
    }

    /// ファイル選択ボタンの表示
    pub fn file_label(&self) -> String {
        self.file
            .as_ref()
            .map(UploadFile::file_name)
            .unwrap_or_else(|| "Choose CSV File".to_string())
    }

    pub fn set_site_name(&mut self, site_name: impl Into<String>) {
        self.site_name = site_name.into();
    }

    /// ファイル選択
    ///
    /// `.csv` 以外（または未選択）の場合は選択を解除してエラーを出す。
    pub fn select_file(&mut self, file: Option<F>) {
        match file {
            Some(file) if is_csv_name(&file.file_name()) => {
                log::debug!("selected {}", file.file_name());
                self.file = Some(file);
                self.error = None;
            }
            _ => {
                self.file = None;
                self.error = Some(INVALID_FILE_MESSAGE.to_string());
            }
        }
    }

    /// 送信開始
    ///
    /// ファイル未選択なら `None`（ネットワークには出さない）。
    /// 送信する場合は前回のエラーと結果を消してローディングにする。
    pub fn begin_submit(&mut self) -> Option<UploadRequest<F>> {
        let Some(file) = self.file.clone() else {
            self.error = Some(MISSING_FILE_MESSAGE.to_string());
            return None;
        };

        self.loading = true;
        self.error = None;
        self.result = None;

        let site_name = if self.site_name.is_empty() {
            None
        } else {
            Some(self.site_name.clone())
        };
        Some(UploadRequest { file, site_name })
    }

    /// 送信結果を反映
    pub fn finish_submit(&mut self, outcome: Result<UploadResult, Error>) {
        self.loading = false;
        match outcome {
            Ok(result) => {
                log::info!("analysis {} completed", result.analysis_id);
                self.result = Some(result);
                self.file = None;
                self.site_name.clear();
            }
            Err(e) => {
                log::warn!("upload failed: {}", e);
                self.error = Some(
                    e.detail()
                        .map(str::to_string)
                        .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string()),
                );
            }
        }
    }
}
