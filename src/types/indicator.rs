use serde::{Deserialize, Serialize};

use super::PriceBar;

/// Classification of a smoothed oscillator average against fixed thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    High,
    Low,
    #[default]
    None,
}

impl Highlight {
    /// Classify a rounded average. `high_at` and `low_at` are inclusive.
    pub fn classify(value: Option<i64>, high_at: i64, low_at: i64) -> Self {
        match value {
            Some(v) if v >= high_at => Highlight::High,
            Some(v) if v <= low_at => Highlight::Low,
            _ => Highlight::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Highlight::High => "high",
            Highlight::Low => "low",
            Highlight::None => "none",
        }
    }
}

impl std::fmt::Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator values attached to one trading day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorOverlay {
    pub oscillator: Option<i64>,
    pub oscillator_avg_short: Option<i64>,
    pub oscillator_avg_long: Option<i64>,
    pub highlight_short: Highlight,
    pub highlight_long: Highlight,
}

/// A price bar with its indicator overlay.
///
/// Series shorter than two bars are returned without an overlay, which
/// serializes as the bare bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    #[serde(flatten)]
    pub bar: PriceBar,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<IndicatorOverlay>,
}

impl IndicatorRecord {
    pub fn bare(bar: PriceBar) -> Self {
        Self { bar, overlay: None }
    }

    pub fn oscillator(&self) -> Option<i64> {
        self.overlay.as_ref().and_then(|o| o.oscillator)
    }

    pub fn avg_short(&self) -> Option<i64> {
        self.overlay.as_ref().and_then(|o| o.oscillator_avg_short)
    }

    pub fn avg_long(&self) -> Option<i64> {
        self.overlay.as_ref().and_then(|o| o.oscillator_avg_long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            open: 10.0,
            high: 11.0,
            low: 9.5,
            close: 10.75,
            volume: 5000,
        }
    }

    #[test]
    fn test_highlight_thresholds() {
        assert_eq!(Highlight::classify(Some(90), 90, 10), Highlight::High);
        assert_eq!(Highlight::classify(Some(10), 90, 10), Highlight::Low);
        assert_eq!(Highlight::classify(Some(50), 90, 10), Highlight::None);
        assert_eq!(Highlight::classify(None, 90, 10), Highlight::None);
        assert_eq!(Highlight::classify(Some(85), 85, 15), Highlight::High);
        assert_eq!(Highlight::classify(Some(16), 85, 15), Highlight::None);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = IndicatorRecord {
            bar: bar(),
            overlay: Some(IndicatorOverlay {
                oscillator: Some(72),
                oscillator_avg_short: None,
                oscillator_avg_long: None,
                highlight_short: Highlight::None,
                highlight_long: Highlight::High,
            }),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-05-06");
        assert_eq!(json["close"], 10.75);
        assert_eq!(json["volume"], 5000);
        assert_eq!(json["oscillator"], 72);
        assert!(json["oscillator_avg_short"].is_null());
        assert_eq!(json["highlight_short"], "none");
        assert_eq!(json["highlight_long"], "high");
    }

    #[test]
    fn test_bare_record_has_no_indicator_fields() {
        let json = serde_json::to_value(IndicatorRecord::bare(bar())).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        assert!(!obj.contains_key("oscillator"));
        assert!(!obj.contains_key("highlight_short"));
    }
}
