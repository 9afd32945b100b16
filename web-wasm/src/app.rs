//! メインアプリケーションコンポーネント

use leptos::prelude::*;
use water_clean_common::ApiConfig;

use crate::api::FetchClient;
use crate::components::{history::HistoryView, layout::Layout, upload::UploadView};

/// 表示中の画面
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Upload,
    History,
}

impl Route {
    /// URLハッシュ（"#/history" など）から判定。不明なものはアップロード画面
    pub fn from_hash(hash: &str) -> Self {
        match hash.trim_start_matches('#').trim_matches('/') {
            "history" => Route::History,
            _ => Route::Upload,
        }
    }

    pub fn hash(&self) -> &'static str {
        match self {
            Route::Upload => "#/",
            Route::History => "#/history",
        }
    }
}

/// 現在のURLハッシュ
pub fn current_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// URLハッシュの変化（リンク・戻る/進む）を画面シグナルに反映
pub fn follow_hash(route: RwSignal<Route>) {
    let handle = window_event_listener(leptos::ev::hashchange, move |_| {
        route.set(Route::from_hash(&current_hash()));
    });
    on_cleanup(move || handle.remove());
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let config = ApiConfig::from_env();
    log::info!("backend: {}", config.base_url());
    provide_context(FetchClient::new(config));

    let route = RwSignal::new(Route::from_hash(&current_hash()));
    follow_hash(route);

    view! {
        <Layout route=route.read_only()>
            {move || match route.get() {
                Route::Upload => view! { <UploadView /> }.into_any(),
                Route::History => view! { <HistoryView notes_enabled=true /> }.into_any(),
            }}
        </Layout>
    }
}
