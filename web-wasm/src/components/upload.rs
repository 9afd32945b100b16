//! CSVアップロード画面

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{HtmlInputElement, SubmitEvent};
use water_clean_common::format::format_measure;
use water_clean_common::{AnalysisApi, UploadForm, UploadResult};

use crate::api::{CsvFile, FetchClient};
use crate::components::category_chip::CategoryChip;

#[component]
pub fn UploadView() -> impl IntoView {
    let client = StoredValue::new(expect_context::<FetchClient>());
    // web_sys::File は Send でないのでローカル保持
    let form = RwSignal::new_local(UploadForm::<CsvFile>::new());
    let form_ref = NodeRef::<html::Form>::new();

    let on_file_change = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        let file = input.files().and_then(|files| files.get(0)).map(CsvFile);
        form.update(|f| f.select_file(file));
        if form.with_untracked(|f| f.file().is_none()) {
            input.set_value("");
        }
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();

        let Some(request) = form.try_update(|f| f.begin_submit()).flatten() else {
            return;
        };

        let client = client.get_value();
        spawn_local(async move {
            let outcome = client
                .upload_csv(&request.file, request.site_name.as_deref())
                .await;
            finish_upload(form, form_ref, outcome);
        });
    };

    view! {
        <section class="upload">
            <h2>"Water Quality Analysis"</h2>

            <div class="panel">
                <form node_ref=form_ref on:submit=on_submit>
                    <h3>"Upload CSV File"</h3>
                    <p class="text-muted">"Upload a CSV file with pH and TDS measurements"</p>

                    <div class="form-group">
                        <label for="site-name">"Site Name (Optional)"</label>
                        <input
                            type="text"
                            id="site-name"
                            placeholder="e.g., Server Room A"
                            prop:value=move || form.with(|f| f.site_name().to_string())
                            on:input=move |ev| {
                                form.update(|f| f.set_site_name(event_target_value(&ev)));
                            }
                        />
                    </div>

                    <label class="btn btn-outline file-picker">
                        {move || form.with(UploadForm::file_label)}
                        <input type="file" accept=".csv" hidden=true on:change=on_file_change />
                    </label>

                    {move || form.with(|f| f.error().map(|e| {
                        view! { <div class="alert alert-error">{e.to_string()}</div> }
                    }))}

                    <button
                        type="submit"
                        class="btn btn-primary"
                        disabled=move || form.with(|f| !f.can_submit())
                    >
                        {move || if form.with(UploadForm::is_loading) {
                            view! { <span class="spinner" /> }.into_any()
                        } else {
                            "Analyze Water Quality".into_any()
                        }}
                    </button>
                </form>
            </div>

            {move || form.with(|f| f.result().cloned()).map(|result| view! { <ResultCard result=result /> })}
        </section>
    }
}

/// アップロード結果を画面に反映
///
/// 画面遷移で破棄済みのシグナル・NodeRef には触れない。
fn finish_upload(
    form: RwSignal<UploadForm<CsvFile>, LocalStorage>,
    form_ref: NodeRef<html::Form>,
    outcome: water_clean_common::Result<UploadResult>,
) {
    let succeeded = outcome.is_ok();
    if form.try_update(|f| f.finish_submit(outcome)).is_none() {
        log::debug!("upload finished after the view was closed");
        return;
    }

    // ファイル入力をリセット
    if succeeded {
        if let Some(el) = form_ref.try_get_untracked().flatten() {
            el.reset();
        }
    }
}

/// 解析結果カード
#[component]
fn ResultCard(result: UploadResult) -> impl IntoView {
    let summary = result.summary;
    let recommendation = result.recommendation;

    view! {
        <div class="panel result-card">
            <h3 class="result-title">"Analysis Complete"</h3>

            <p class="text-muted">"File: "{result.original_filename}</p>
            {result.site_name.filter(|s| !s.is_empty()).map(|site| view! {
                <p class="text-muted">"Site: "{site}</p>
            })}

            <hr />

            <h4>"Water Quality Summary"</h4>
            <p>
                <strong>"Average pH: "</strong>
                {format_measure(summary.avg_ph)}
                " "
                <CategoryChip label=summary.ph_category />
            </p>
            <p>
                <strong>"Average TDS: "</strong>
                {format!("{} mg/L", format_measure(summary.avg_tds))}
                " "
                <CategoryChip label=summary.tds_category />
            </p>
            <p class="text-muted">{format!("Samples analyzed: {}", summary.row_count)}</p>

            <hr />

            <h4>"Treatment Recommendation"</h4>
            <div class="recommendation">
                <p class="treatment-train">{recommendation.treatment_train}</p>
                <p>{recommendation.explanation}</p>
            </div>

            <p class="caption">{format!("Analysis ID: {}", result.analysis_id)}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_clean_common::{AnalysisId, Recommendation, WaterSummary};

    fn upload_result() -> UploadResult {
        UploadResult {
            analysis_id: AnalysisId::from(7),
            original_filename: "room-a.csv".to_string(),
            site_name: None,
            summary: WaterSummary {
                avg_ph: 8.0,
                ph_category: "Within target".to_string(),
                avg_tds: 90.0,
                tds_category: "Low".to_string(),
                row_count: 12,
            },
            recommendation: Recommendation {
                treatment_train: "Sand filter".to_string(),
                explanation: "Water is within range.".to_string(),
            },
        }
    }

    /// 画面が残っていれば結果を表示
    #[test]
    fn test_finish_upload_shows_result() {
        let owner = Owner::new();
        owner.with(|| {
            let form = RwSignal::new_local(UploadForm::<CsvFile>::new());
            let form_ref = NodeRef::<html::Form>::new();

            finish_upload(form, form_ref, Ok(upload_result()));

            assert!(form.with_untracked(|f| f.result().is_some()));
            assert!(!form.with_untracked(UploadForm::is_loading));
        });
    }

    /// 画面を離れた後に完了しても落ちない
    #[test]
    fn test_finish_upload_after_view_closed() {
        let owner = Owner::new();
        let (form, form_ref) = owner.with(|| {
            (
                RwSignal::new_local(UploadForm::<CsvFile>::new()),
                NodeRef::<html::Form>::new(),
            )
        });
        drop(owner);

        finish_upload(form, form_ref, Ok(upload_result()));
        finish_upload(form, form_ref, Err(water_clean_common::Error::Network("offline".into())));
    }
}
