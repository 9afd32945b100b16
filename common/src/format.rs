//! 表示用の整形

use chrono::{DateTime, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// アップロード日時を表示用に整形
///
/// RFC 3339（オフセット付き）とオフセット無しのISO形式に対応。
/// どちらでもなければ元の文字列をそのまま返す。
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(DISPLAY_FORMAT).to_string();
        }
    }
    raw.to_string()
}

/// 測定値（pH・TDS）を小数2桁で表示
pub fn format_measure(value: f64) -> String {
    format!("{:.2}", value)
}
