//! カテゴリ表示チップ

use leptos::prelude::*;
use water_clean_common::classify;

#[component]
pub fn CategoryChip(label: String) -> impl IntoView {
    let class = format!("chip chip-{}", classify(&label).as_str());
    view! {
        <span class=class>{label}</span>
    }
}
