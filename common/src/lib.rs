//! Water Clean Common Library
//!
//! Web(WASM)フロントエンドとテストで共有される型・API契約・画面状態

pub mod api;
pub mod category;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod types;
pub mod upload;

pub use api::{parse_error_detail, AnalysisApi, UploadFile};
pub use category::{classify, Indicator};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use history::{HistoryState, NoteSession, NotesRequest, PageRequest};
pub use types::{AnalysisId, AnalysisRecord, HistoryPage, Recommendation, UploadResult, WaterSummary};
pub use upload::{UploadForm, UploadRequest};
