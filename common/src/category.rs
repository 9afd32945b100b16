//! 水質カテゴリの表示分類と閾値

/// pH目標範囲（下限, 上限）
pub const PH_TARGET_RANGE: (f64, f64) = (7.5, 8.3);

/// TDSがLowとなる上限（未満）mg/L
pub const TDS_LOW_BELOW: u32 = 100;

/// TDSがHighとなる下限（以上）mg/L
pub const TDS_HIGH_FROM: u32 = 300;

/// カテゴリラベルの表示上の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Positive,
    Cautionary,
    Negative,
}

impl Indicator {
    /// CSSクラス名
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Positive => "success",
            Indicator::Cautionary => "warning",
            Indicator::Negative => "error",
        }
    }
}

/// バックエンドが付けたカテゴリラベルを分類する
///
/// - "target" を含む、または "Low" と一致 → Positive
/// - "Moderate" を含む → Cautionary
/// - それ以外 → Negative
///
/// # Examples
/// ```
/// use water_clean_common::category::{classify, Indicator};
///
/// assert_eq!(classify("Within target"), Indicator::Positive);
/// assert_eq!(classify("High"), Indicator::Negative);
/// ```
pub fn classify(label: &str) -> Indicator {
    if label.contains("target") || label == "Low" {
        Indicator::Positive
    } else if label.contains("Moderate") {
        Indicator::Cautionary
    } else {
        Indicator::Negative
    }
}

/// フッターに表示する閾値の説明
pub fn thresholds_caption() -> String {
    let (ph_min, ph_max) = PH_TARGET_RANGE;
    format!(
        "pH Target Range: {:.1}-{:.1} | TDS Categories: Low (<{}), Moderate ({}-{}), High (≥{} mg/L)",
        ph_min,
        ph_max,
        TDS_LOW_BELOW,
        TDS_LOW_BELOW,
        TDS_HIGH_FROM - 1,
        TDS_HIGH_FROM
    )
}
