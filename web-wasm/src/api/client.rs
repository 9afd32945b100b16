//! fetch による解析APIクライアント
//!
//! - アップロード: multipart（境界はブラウザが付ける）
//! - その他: JSON
//! - 2xx以外はレスポンスの `detail` を拾って `Error::Http` にする

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, RequestMode, Response};
use water_clean_common::types::NotesUpdate;
use water_clean_common::{
    parse_error_detail, AnalysisApi, AnalysisId, AnalysisRecord, ApiConfig, Error, HistoryPage,
    Result, UploadFile, UploadResult,
};

/// ブラウザで選択されたCSVファイル
#[derive(Clone, Debug)]
pub struct CsvFile(pub File);

impl UploadFile for CsvFile {
    fn file_name(&self) -> String {
        self.0.name()
    }
}

/// リクエストボディ
enum Body {
    Empty,
    Json(String),
    Form(FormData),
}

/// fetch ベースのAPIクライアント
#[derive(Clone, Debug, Default)]
pub struct FetchClient {
    config: ApiConfig,
}

impl FetchClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    /// リクエスト送信（共通処理）
    async fn send<T: DeserializeOwned>(&self, method: &str, url: &str, body: Body) -> Result<T> {
        log::info!("{} {}", method, url);

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        let is_json = matches!(body, Body::Json(_));
        match body {
            Body::Empty => {}
            Body::Json(json) => opts.set_body(&JsValue::from_str(&json)),
            Body::Form(form) => opts.set_body(&form.into()),
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        if is_json {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let window = web_sys::window()
            .ok_or_else(|| Error::Network("window is not available".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;

        if !resp.ok() {
            let text = error_body(&resp).await;
            log::warn!("{} {} -> {}", method, url, resp.status());
            return Err(Error::Http {
                status: resp.status(),
                detail: parse_error_detail(&text),
            });
        }

        let json = JsFuture::from(resp.json().map_err(js_error)?)
            .await
            .map_err(|e| Error::Decode(describe(&e)))?;
        serde_wasm_bindgen::from_value(json).map_err(|e| Error::Decode(e.to_string()))
    }
}

impl AnalysisApi for FetchClient {
    type File = CsvFile;

    async fn upload_csv(&self, file: &CsvFile, site_name: Option<&str>) -> Result<UploadResult> {
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob("file", &file.0).map_err(js_error)?;
        if let Some(site_name) = site_name.filter(|s| !s.is_empty()) {
            form.append_with_str("site_name", site_name).map_err(js_error)?;
        }

        self.send("POST", &self.config.upload_url(), Body::Form(form))
            .await
    }

    async fn get_analysis_history(&self, limit: u32, offset: u64) -> Result<HistoryPage> {
        self.send("GET", &self.config.history_url(limit, offset), Body::Empty)
            .await
    }

    async fn get_analysis_by_id(&self, id: &AnalysisId) -> Result<AnalysisRecord> {
        self.send("GET", &self.config.analysis_url(id), Body::Empty)
            .await
    }

    async fn update_analysis_notes(&self, id: &AnalysisId, notes: &str) -> Result<AnalysisRecord> {
        let body = serde_json::to_string(&NotesUpdate { user_notes: notes })?;
        self.send("PATCH", &self.config.notes_url(id), Body::Json(body))
            .await
    }
}

/// エラーレスポンスの本文（読めなければ空）
async fn error_body(resp: &Response) -> String {
    let Ok(promise) = resp.text() else {
        return String::new();
    };
    JsFuture::from(promise)
        .await
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

fn js_error(e: JsValue) -> Error {
    Error::Network(describe(&e))
}

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}
