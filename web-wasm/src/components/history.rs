//! 解析履歴画面
//!
//! ページングはサーバー側（limit/offset）。`notes_enabled` でメモ列の有無を切り替える。

use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::MouseEvent;
use water_clean_common::format::{format_measure, format_timestamp};
use water_clean_common::history::{EMPTY_MESSAGE, ROWS_PER_PAGE_OPTIONS};
use water_clean_common::{AnalysisApi, AnalysisId, AnalysisRecord, HistoryState, NoteSession, PageRequest};

use crate::api::FetchClient;
use crate::components::category_chip::CategoryChip;

/// 画面の表示モード
#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Loading,
    Empty,
    Table,
}

#[component]
pub fn HistoryView(#[prop(default = true)] notes_enabled: bool) -> impl IntoView {
    let client = StoredValue::new(expect_context::<FetchClient>());
    let state = RwSignal::new(HistoryState::new(notes_enabled));

    let load = move |request: PageRequest| load_page(client.get_value(), state, request);

    let go_to_page = move |page: u32| {
        if let Some(request) = state.try_update(|s| s.set_page(page)).flatten() {
            load(request);
        }
    };

    if let Some(request) = state.try_update(HistoryState::request_current) {
        load(request);
    }

    let mode = Memo::new(move |_| {
        state.with(|s| {
            if s.is_loading() {
                Mode::Loading
            } else if s.is_empty() {
                Mode::Empty
            } else {
                Mode::Table
            }
        })
    });

    let table = move || {
        view! {
            <div class="panel">
                <table class="history-table">
                    <thead>
                        <tr>
                            <th>"Date"</th>
                            <th>"File"</th>
                            <th>"Site"</th>
                            <th class="center">"pH"</th>
                            <th class="center">"pH Status"</th>
                            <th class="center">"TDS (mg/L)"</th>
                            <th class="center">"TDS Status"</th>
                            <th>"Recommended Treatment"</th>
                            {notes_enabled.then(|| view! { <th>"Methods Actually Used"</th> })}
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || state.with(|s| s.records().to_vec())
                            key=|record| record.id.clone()
                            children=move |record| view! { <HistoryRow record=record state=state client=client /> }
                        />
                    </tbody>
                </table>

                <div class="pagination">
                    <label>
                        "Rows per page: "
                        <select on:change=move |ev| {
                            if let Ok(rows) = event_target_value(&ev).parse::<u32>() {
                                if let Some(request) = state.try_update(|s| s.set_rows_per_page(rows)).flatten() {
                                    load(request);
                                }
                            }
                        }>
                            {ROWS_PER_PAGE_OPTIONS
                                .iter()
                                .map(|&rows| view! {
                                    <option
                                        value=rows.to_string()
                                        selected=move || state.with(|s| s.rows_per_page() == rows)
                                    >
                                        {rows}
                                    </option>
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <span class="range">{move || state.with(HistoryState::range_label)}</span>
                    <button
                        class="btn btn-small"
                        disabled=move || !state.with(HistoryState::has_prev_page)
                        on:click=move |_| go_to_page(state.with_untracked(HistoryState::page).saturating_sub(1))
                    >
                        "‹"
                    </button>
                    <button
                        class="btn btn-small"
                        disabled=move || !state.with(HistoryState::has_next_page)
                        on:click=move |_| go_to_page(state.with_untracked(HistoryState::page) + 1)
                    >
                        "›"
                    </button>
                </div>
            </div>
        }
    };

    view! {
        <section class="history">
            <h2>"Analysis History"</h2>

            {move || state.with(|s| s.error().map(|e| {
                view! { <div class="alert alert-error">{e.to_string()}</div> }
            }))}

            {move || match mode.get() {
                Mode::Loading => view! { <div class="loading"><span class="spinner" /></div> }.into_any(),
                Mode::Empty => view! {
                    <div class="panel empty">
                        <p class="text-muted">{EMPTY_MESSAGE}</p>
                    </div>
                }.into_any(),
                Mode::Table => table().into_any(),
            }}
        </section>
    }
}

/// 1ページ取得して状態に反映
///
/// 件数が減って範囲外のページになった場合は最終ページを取り直す。
/// 画面を離れた後に届いた結果は捨てる。
fn load_page(client: FetchClient, state: RwSignal<HistoryState>, request: PageRequest) {
    spawn_local(async move {
        let outcome = client
            .get_analysis_history(request.limit, request.offset)
            .await;
        let retry = state
            .try_update(|s| {
                if s.apply_page(request.seq, outcome) {
                    s.clamp_page()
                } else {
                    None
                }
            })
            .flatten();
        if let Some(request) = retry {
            load_page(client, state, request);
        }
    });
}

/// 履歴1行
///
/// メモ以外の列はサーバー値のままなので、行作成時の値で描画する。
#[component]
fn HistoryRow(
    record: AnalysisRecord,
    state: RwSignal<HistoryState>,
    client: StoredValue<FetchClient>,
) -> impl IntoView {
    let notes_enabled = state.with_untracked(HistoryState::notes_enabled);

    let recommendation = match record.recommendation() {
        Some((train, explanation)) => view! {
            <div>
                <p class="treatment-train">{train.to_string()}</p>
                <p class="caption">{explanation.to_string()}</p>
            </div>
        }
        .into_any(),
        None => view! { <em class="caption text-muted">"Not available for old records"</em> }.into_any(),
    };

    let site = record
        .site_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "-".to_string());

    view! {
        <tr>
            <td>{format_timestamp(&record.upload_timestamp)}</td>
            <td class="file-name">{record.original_filename.clone()}</td>
            <td class="text-muted">{site}</td>
            <td class="center numeric">{format_measure(record.avg_ph)}</td>
            <td class="center"><CategoryChip label=record.ph_category.clone() /></td>
            <td class="center numeric">{format_measure(record.avg_tds)}</td>
            <td class="center"><CategoryChip label=record.tds_category.clone() /></td>
            <td>{recommendation}</td>
            {notes_enabled.then(|| view! {
                <td><NotesCell id=record.id.clone() state=state client=client /></td>
            })}
        </tr>
    }
}

/// メモ列（表示 / 編集 / 保存中）
#[component]
fn NotesCell(
    id: AnalysisId,
    state: RwSignal<HistoryState>,
    client: StoredValue<FetchClient>,
) -> impl IntoView {
    // 下書き入力のたびに編集欄を作り直さないよう、表示切替は状態の種類だけで判定
    let editing = {
        let id = id.clone();
        Memo::new(move |_| state.with(|s| *s.note_session(&id) != NoteSession::Viewing))
    };

    move || {
        let id = id.clone();
        if editing.get() {
            editing_view(id, state, client).into_any()
        } else {
            viewing_view(id, state).into_any()
        }
    }
}

fn viewing_view(id: AnalysisId, state: RwSignal<HistoryState>) -> impl IntoView {
    let notes = state.with_untracked(|s| s.record(&id).and_then(|r| r.notes()).map(str::to_string));
    let on_edit = move |_: MouseEvent| state.update(|s| s.begin_edit(&id));

    match notes {
        Some(notes) => view! {
            <div class="notes">
                <p class="notes-text">{notes}</p>
                <button class="btn btn-small btn-outline" on:click=on_edit>"Edit"</button>
            </div>
        }
        .into_any(),
        None => view! {
            <div class="notes">
                <button class="btn btn-small btn-primary" on:click=on_edit>"Add Notes"</button>
            </div>
        }
        .into_any(),
    }
}

fn editing_view(
    id: AnalysisId,
    state: RwSignal<HistoryState>,
    client: StoredValue<FetchClient>,
) -> impl IntoView {
    let saving = {
        let id = id.clone();
        move || state.with(|s| s.note_session(&id).is_saving())
    };

    let draft = {
        let id = id.clone();
        move || state.with(|s| s.note_session(&id).draft().unwrap_or_default().to_string())
    };

    let on_input = {
        let id = id.clone();
        move |ev: web_sys::Event| state.update(|s| s.update_draft(&id, event_target_value(&ev)))
    };

    let on_save = {
        let id = id.clone();
        move |_: MouseEvent| {
            let Some(request) = state.try_update(|s| s.begin_save(&id)).flatten() else {
                return;
            };
            let client = client.get_value();
            spawn_local(async move {
                let outcome = client
                    .update_analysis_notes(&request.id, &request.notes)
                    .await;
                state.update(|s| s.finish_save(&request.id, outcome));
            });
        }
    };

    let on_cancel = move |_: MouseEvent| state.update(|s| s.cancel_edit(&id));

    let save_label = {
        let saving = saving.clone();
        move || if saving() { "Saving..." } else { "Save" }
    };
    let save_disabled = saving.clone();

    view! {
        <div class="notes-editor">
            <textarea
                rows="3"
                placeholder="Describe the methods you actually used..."
                prop:value=draft
                on:input=on_input
            />
            <div class="notes-actions">
                <button class="btn btn-small btn-primary" disabled=save_disabled on:click=on_save>
                    {save_label}
                </button>
                <button class="btn btn-small btn-outline" disabled=saving on:click=on_cancel>
                    "Cancel"
                </button>
            </div>
        </div>
    }
}
