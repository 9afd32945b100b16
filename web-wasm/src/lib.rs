//! Water Clean Web App (Leptos + WASM)

pub mod api;
pub mod app;
mod components;

use wasm_bindgen::prelude::*;

/// ブラウザコンソールへのログ出力を設定
///
/// 二重に呼ばれた場合などの失敗はコンソールに警告して続行する。
pub fn init_logging() {
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("logger init failed: {}", e).into());
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    init_logging();
    leptos::mount::mount_to_body(app::App);
}
