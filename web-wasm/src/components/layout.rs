//! ナビゲーションとフッター

use leptos::prelude::*;
use water_clean_common::category::thresholds_caption;
use crate::app::Route;

#[component]
pub fn Layout(route: ReadSignal<Route>, children: Children) -> impl IntoView {
    let nav_link = move |target: Route, label: &'static str| {
        view! {
            <a
                href=target.hash()
                class="nav-link"
                class:active=move || route.get() == target
            >
                {label}
            </a>
        }
    };

    view! {
        <div class="layout">
            <header class="header">
                <h1>"DataCenter Water Clean"</h1>
                <nav>
                    {nav_link(Route::Upload, "Upload")}
                    {nav_link(Route::History, "History")}
                </nav>
            </header>

            <main class="container">
                {children()}
            </main>

            <footer class="footer">
                <p>"DataCenter Water Clean - Water Quality Analysis System"</p>
                <p class="caption">{thresholds_caption()}</p>
            </footer>
        </div>
    }
}
