//! 履歴画面の状態
//!
//! - ページング（limit/offset はサーバー側で処理）
//! - ページ取得の連番管理（古いレスポンスは捨てる）
//! - レコードごとのメモ編集セッション（Viewing → Editing → Saving）

use std::collections::HashMap;

use crate::error::Error;
use crate::types::{AnalysisId, AnalysisRecord, HistoryPage};

pub const ROWS_PER_PAGE_OPTIONS: [u32; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: u32 = 10;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load analysis history";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save notes";
pub const EMPTY_MESSAGE: &str = "No analyses found. Upload a CSV file to get started.";

/// ページ取得リクエスト
///
/// `seq` は発行順の連番。最新の `seq` 以外のレスポンスは反映しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub limit: u32,
    pub offset: u64,
}

/// メモ更新リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesRequest {
    pub id: AnalysisId,
    pub notes: String,
}

/// レコード1件のメモ編集状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSession {
    Viewing,
    Editing { draft: String },
    Saving { draft: String },
}

impl NoteSession {
    pub fn draft(&self) -> Option<&str> {
        match self {
            NoteSession::Viewing => None,
            NoteSession::Editing { draft } | NoteSession::Saving { draft } => Some(draft),
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, NoteSession::Saving { .. })
    }
}

/// 履歴画面の状態
#[derive(Debug, Clone)]
pub struct HistoryState {
    notes_enabled: bool,
    records: Vec<AnalysisRecord>,
    loading: bool,
    error: Option<String>,
    page: u32,
    rows_per_page: u32,
    total: u64,
    latest_seq: u64,
    /// Viewing 以外のセッションのみ保持
    sessions: HashMap<AnalysisId, NoteSession>,
}

impl HistoryState {
    /// `notes_enabled` が false の場合はメモ列と編集を持たない
    pub fn new(notes_enabled: bool) -> Self {
        Self {
            notes_enabled,
            records: Vec::new(),
            loading: true,
            error: None,
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            total: 0,
            latest_seq: 0,
            sessions: HashMap::new(),
        }
    }

    pub fn notes_enabled(&self) -> bool {
        self.notes_enabled
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn record(&self, id: &AnalysisId) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// 総件数が0なら空表示
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// 現在のページを取得するリクエストを発行
    pub fn request_current(&mut self) -> PageRequest {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        PageRequest {
            seq: self.latest_seq,
            limit: self.rows_per_page,
            offset: u64::from(self.page) * u64::from(self.rows_per_page),
        }
    }

    /// ページ移動（変化がなければ何もしない）
    pub fn set_page(&mut self, page: u32) -> Option<PageRequest> {
        if page == self.page {
            return None;
        }
        self.page = page;
        Some(self.request_current())
    }

    /// 表示件数の変更（ページは先頭に戻る）
    pub fn set_rows_per_page(&mut self, rows_per_page: u32) -> Option<PageRequest> {
        if rows_per_page == 0 || rows_per_page == self.rows_per_page {
            return None;
        }
        self.rows_per_page = rows_per_page;
        self.page = 0;
        Some(self.request_current())
    }

    /// ページ取得結果を反映
    ///
    /// 最新でないリクエストの結果は捨てて `false` を返す。
    pub fn apply_page(&mut self, seq: u64, outcome: Result<HistoryPage, Error>) -> bool {
        if seq != self.latest_seq {
            log::debug!("discarding stale history response #{} (latest #{})", seq, self.latest_seq);
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(page) => {
                log::debug!("history page: {} of {} records", page.analyses.len(), page.total);
                self.records = page.analyses;
                self.total = page.total;
                let records = &self.records;
                self.sessions
                    .retain(|id, _| records.iter().any(|r| &r.id == id));
            }
            Err(e) => {
                log::warn!("history fetch failed: {}", e);
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// 総件数が減って現在ページが範囲外になった場合、最終ページへ戻す
    ///
    /// 戻した場合は再取得リクエストを返す。
    pub fn clamp_page(&mut self) -> Option<PageRequest> {
        let last = self.page_count().checked_sub(1)?;
        if u64::from(self.page) <= last {
            return None;
        }
        log::debug!("page {} is past the end, moving to {}", self.page, last);
        self.page = u32::try_from(last).unwrap_or(u32::MAX);
        Some(self.request_current())
    }

    /// 最終ページ番号+1（0件なら0）
    pub fn page_count(&self) -> u64 {
        let rows = u64::from(self.rows_per_page);
        self.total.div_ceil(rows)
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) + 1 < self.page_count()
    }

    /// "11–20 of 42" 形式の表示
    pub fn range_label(&self) -> String {
        let rows = u64::from(self.rows_per_page);
        let start = u64::from(self.page) * rows;
        let from = if self.total == 0 { 0 } else { (start + 1).min(self.total) };
        let to = (start + rows).min(self.total);
        format!("{}–{} of {}", from, to, self.total)
    }

    /// レコードのメモ編集状態
    pub fn note_session(&self, id: &AnalysisId) -> &NoteSession {
        self.sessions.get(id).unwrap_or(&NoteSession::Viewing)
    }

    /// 編集開始
    ///
    /// 下書きはレコードの現在のメモ（無ければ空文字）。
    /// 編集中に再度呼ぶと未保存の下書きは上書きされる。
    pub fn begin_edit(&mut self, id: &AnalysisId) {
        if !self.notes_enabled || self.note_session(id).is_saving() {
            return;
        }
        let Some(record) = self.record(id) else {
            return;
        };
        let draft = record.user_notes.clone().unwrap_or_default();
        self.sessions.insert(id.clone(), NoteSession::Editing { draft });
    }

    /// 下書きを更新（編集中のみ）
    pub fn update_draft(&mut self, id: &AnalysisId, text: impl Into<String>) {
        if let Some(NoteSession::Editing { draft }) = self.sessions.get_mut(id) {
            *draft = text.into();
        }
    }

    /// 保存開始
    pub fn begin_save(&mut self, id: &AnalysisId) -> Option<NotesRequest> {
        let notes = match self.sessions.get(id) {
            Some(NoteSession::Editing { draft }) => draft.clone(),
            _ => return None,
        };
        self.sessions
            .insert(id.clone(), NoteSession::Saving { draft: notes.clone() });
        self.error = None;
        Some(NotesRequest {
            id: id.clone(),
            notes,
        })
    }

    /// 保存結果を反映
    ///
    /// 成功: サーバーが返したメモをレコードに反映して編集終了。
    /// 失敗: 編集状態に戻してエラー表示（再試行できる）。
    pub fn finish_save(&mut self, id: &AnalysisId, outcome: Result<AnalysisRecord, Error>) {
        match outcome {
            Ok(updated) => {
                if let Some(record) = self.records.iter_mut().find(|r| &r.id == id) {
                    record.user_notes = updated.user_notes;
                }
                self.sessions.remove(id);
            }
            Err(e) => {
                log::warn!("saving notes for {} failed: {}", id, e);
                if let Some(NoteSession::Saving { draft }) = self.sessions.get(id) {
                    let draft = draft.clone();
                    self.sessions.insert(id.clone(), NoteSession::Editing { draft });
                }
                self.error = Some(SAVE_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// 編集取消（保存中は無視）
    pub fn cancel_edit(&mut self, id: &AnalysisId) {
        if matches!(self.sessions.get(id), Some(NoteSession::Editing { .. })) {
            self.sessions.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, notes: Option<&str>) -> AnalysisRecord {
        AnalysisRecord {
            id: AnalysisId::Number(id),
            upload_timestamp: "2024-06-03T14:05:09".to_string(),
            original_filename: format!("site-{}.csv", id),
            site_name: None,
            avg_ph: 7.8,
            ph_category: "Within target".to_string(),
            avg_tds: 120.0,
            tds_category: "Moderate".to_string(),
            treatment_train: None,
            explanation: None,
            user_notes: notes.map(str::to_string),
        }
    }

    fn loaded(records: Vec<AnalysisRecord>, total: u64) -> HistoryState {
        let mut state = HistoryState::new(true);
        let request = state.request_current();
        state.apply_page(
            request.seq,
            Ok(HistoryPage {
                analyses: records,
                total,
            }),
        );
        state
    }

    #[test]
    fn test_initial_request() {
        let mut state = HistoryState::new(true);
        assert!(state.is_loading());
        let request = state.request_current();
        assert_eq!(request.limit, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_set_same_page_is_noop() {
        let mut state = loaded(vec![record(1, None)], 1);
        assert!(state.set_page(0).is_none());
        assert!(state.set_rows_per_page(DEFAULT_ROWS_PER_PAGE).is_none());
        assert!(state.set_rows_per_page(0).is_none());
    }

    #[test]
    fn test_set_page_offset() {
        let mut state = loaded(vec![record(1, None)], 42);
        let request = state.set_page(2).unwrap();
        assert_eq!(request.limit, 10);
        assert_eq!(request.offset, 20);
        assert!(state.is_loading());
    }

    #[test]
    fn test_set_rows_per_page_resets_page() {
        let mut state = loaded(vec![record(1, None)], 42);
        state.set_page(3).unwrap();
        let request = state.set_rows_per_page(25).unwrap();
        assert_eq!(state.page(), 0);
        assert_eq!(request.limit, 25);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = loaded(vec![record(1, None)], 30);
        let slow = state.set_page(1).unwrap();
        let fast = state.set_page(2).unwrap();

        assert!(state.apply_page(
            fast.seq,
            Ok(HistoryPage { analyses: vec![record(21, None)], total: 30 })
        ));
        assert!(!state.apply_page(
            slow.seq,
            Ok(HistoryPage { analyses: vec![record(11, None)], total: 30 })
        ));

        assert_eq!(state.records()[0].id, AnalysisId::Number(21));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_load_failure_sets_banner() {
        let mut state = HistoryState::new(false);
        let request = state.request_current();
        state.apply_page(request.seq, Err(Error::Network("offline".into())));
        assert_eq!(state.error(), Some(LOAD_FAILED_MESSAGE));
        assert!(!state.is_loading());

        // 再取得でエラーは消える
        state.request_current();
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_pagination_labels() {
        let mut state = loaded(vec![record(1, None)], 42);
        assert_eq!(state.page_count(), 5);
        assert_eq!(state.range_label(), "1–10 of 42");
        assert!(!state.has_prev_page());
        assert!(state.has_next_page());

        state.set_page(4);
        assert_eq!(state.range_label(), "41–42 of 42");
        assert!(state.has_prev_page());
        assert!(!state.has_next_page());

        let empty = loaded(vec![], 0);
        assert!(empty.is_empty());
        assert_eq!(empty.page_count(), 0);
        assert_eq!(empty.range_label(), "0–0 of 0");
        assert!(!empty.has_next_page());
    }

    #[test]
    fn test_page_past_end_moves_to_last_page() {
        let mut state = loaded(vec![record(1, None)], 42);
        let request = state.set_page(4).unwrap();

        // 取得中に件数が減った
        assert!(state.apply_page(request.seq, Ok(HistoryPage { analyses: vec![], total: 30 })));
        let retry = state.clamp_page().unwrap();
        assert_eq!(state.page(), 2);
        assert_eq!(retry.offset, 20);
        assert_eq!(retry.limit, 10);
        assert!(state.is_loading());
        assert_eq!(state.range_label(), "21–30 of 30");

        state.apply_page(
            retry.seq,
            Ok(HistoryPage { analyses: vec![record(21, None)], total: 30 }),
        );
        assert!(state.clamp_page().is_none());
        assert!(!state.has_next_page());
    }

    #[test]
    fn test_clamp_page_noop_when_in_range_or_empty() {
        let mut state = loaded(vec![record(1, None)], 42);
        assert!(state.clamp_page().is_none());

        let mut empty = loaded(vec![], 0);
        assert!(empty.clamp_page().is_none());
        assert_eq!(empty.page(), 0);
    }

    #[test]
    fn test_begin_edit_seeds_draft() {
        let mut state = loaded(vec![record(1, Some("used UV")), record(2, None)], 2);
        let one = AnalysisId::Number(1);
        let two = AnalysisId::Number(2);

        state.begin_edit(&one);
        state.begin_edit(&two);

        assert_eq!(state.note_session(&one).draft(), Some("used UV"));
        assert_eq!(state.note_session(&two).draft(), Some(""));
    }

    #[test]
    fn test_second_edit_overwrites_draft() {
        let mut state = loaded(vec![record(1, Some("original"))], 1);
        let id = AnalysisId::Number(1);

        state.begin_edit(&id);
        state.update_draft(&id, "unsaved");
        state.begin_edit(&id);
        assert_eq!(state.note_session(&id).draft(), Some("original"));
    }

    #[test]
    fn test_notes_disabled_ignores_edit() {
        let mut state = HistoryState::new(false);
        let request = state.request_current();
        state.apply_page(
            request.seq,
            Ok(HistoryPage { analyses: vec![record(1, None)], total: 1 }),
        );
        let id = AnalysisId::Number(1);
        state.begin_edit(&id);
        assert_eq!(state.note_session(&id), &NoteSession::Viewing);
    }

    #[test]
    fn test_save_success_patches_record() {
        let mut state = loaded(vec![record(1, None)], 1);
        let id = AnalysisId::Number(1);

        state.begin_edit(&id);
        state.update_draft(&id, "sand filter + UV");
        let request = state.begin_save(&id).unwrap();
        assert_eq!(request.notes, "sand filter + UV");
        assert!(state.note_session(&id).is_saving());

        // 保存中は取消も再編集もできない
        state.cancel_edit(&id);
        state.begin_edit(&id);
        assert!(state.note_session(&id).is_saving());

        state.finish_save(&id, Ok(record(1, Some("sand filter + UV"))));
        assert_eq!(state.note_session(&id), &NoteSession::Viewing);
        assert_eq!(state.records()[0].notes(), Some("sand filter + UV"));
    }

    #[test]
    fn test_save_failure_keeps_editing() {
        let mut state = loaded(vec![record(1, Some("old"))], 1);
        let id = AnalysisId::Number(1);

        state.begin_edit(&id);
        state.update_draft(&id, "new");
        state.begin_save(&id).unwrap();
        state.finish_save(
            &id,
            Err(Error::Http { status: 500, detail: None }),
        );

        assert_eq!(
            state.note_session(&id),
            &NoteSession::Editing { draft: "new".to_string() }
        );
        assert_eq!(state.error(), Some(SAVE_FAILED_MESSAGE));
        assert_eq!(state.records()[0].notes(), Some("old"));

        // 再試行でバナーは消える
        assert!(state.begin_save(&id).is_some());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_cancel_reverts_to_server_value() {
        let mut state = loaded(vec![record(1, Some("confirmed"))], 1);
        let id = AnalysisId::Number(1);

        state.begin_edit(&id);
        state.update_draft(&id, "scratch");
        state.cancel_edit(&id);
        assert_eq!(state.note_session(&id), &NoteSession::Viewing);
        assert_eq!(state.records()[0].notes(), Some("confirmed"));

        state.begin_edit(&id);
        assert_eq!(state.note_session(&id).draft(), Some("confirmed"));
    }

    #[test]
    fn test_begin_save_requires_editing() {
        let mut state = loaded(vec![record(1, None)], 1);
        assert!(state.begin_save(&AnalysisId::Number(1)).is_none());
        assert!(state.begin_save(&AnalysisId::Number(99)).is_none());
    }

    #[test]
    fn test_sessions_pruned_on_page_change() {
        let mut state = loaded(vec![record(1, None)], 20);
        let id = AnalysisId::Number(1);
        state.begin_edit(&id);

        let request = state.set_page(1).unwrap();
        state.apply_page(
            request.seq,
            Ok(HistoryPage { analyses: vec![record(11, None)], total: 20 }),
        );
        assert_eq!(state.note_session(&id), &NoteSession::Viewing);
    }
}
