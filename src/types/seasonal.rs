use serde::{Deserialize, Serialize};

/// Number of forward holding horizons, in trading days (1 through 15).
pub const HORIZON_COUNT: usize = 15;

/// Holding horizons in trading days, in the order the per-horizon arrays use.
pub const HORIZONS: [usize; HORIZON_COUNT] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Aggregated forward-return statistics for one trading day of the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalSlot {
    /// 1-based trading day within the calendar year.
    #[serde(rename = "tradingDayNum")]
    pub trading_day_index: u32,
    /// Matching date in the reference year, e.g. `Jan 2, 2025`.
    #[serde(rename = "date")]
    pub calendar_date_label: String,
    /// Historical rows (one per year) that fell on this trading day.
    #[serde(rename = "tradeCount")]
    pub sample_count: u32,
    #[serde(rename = "avgReturns")]
    pub avg_forward_return: [f64; HORIZON_COUNT],
    #[serde(rename = "winRates")]
    pub win_rate: [f64; HORIZON_COUNT],
    /// Defined forward-return observations per horizon. Rows near the end
    /// of the history have no value for the longer horizons.
    #[serde(rename = "sampleCounts")]
    pub horizon_samples: [u32; HORIZON_COUNT],
}

impl SeasonalSlot {
    /// A slot with no historical observations.
    pub fn empty(trading_day_index: u32, calendar_date_label: String) -> Self {
        Self {
            trading_day_index,
            calendar_date_label,
            sample_count: 0,
            avg_forward_return: [0.0; HORIZON_COUNT],
            win_rate: [0.0; HORIZON_COUNT],
            horizon_samples: [0; HORIZON_COUNT],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizons_cover_one_to_fifteen() {
        assert_eq!(HORIZONS.first(), Some(&1));
        assert_eq!(HORIZONS.last(), Some(&15));
        assert!(HORIZONS.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn test_slot_json_field_names() {
        let mut slot = SeasonalSlot::empty(3, "Jan 6, 2025".to_string());
        slot.sample_count = 2;
        slot.avg_forward_return[0] = 0.01;
        slot.win_rate[0] = 0.5;
        slot.horizon_samples[0] = 2;

        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["tradingDayNum"], 3);
        assert_eq!(json["date"], "Jan 6, 2025");
        assert_eq!(json["tradeCount"], 2);
        assert_eq!(json["avgReturns"].as_array().unwrap().len(), HORIZON_COUNT);
        assert_eq!(json["winRates"][0], 0.5);
        assert_eq!(json["sampleCounts"][0], 2);
    }

    #[test]
    fn test_empty_slot_is_zero_filled() {
        let slot = SeasonalSlot::empty(250, "Dec 29, 2025".to_string());
        assert!(slot.is_empty());
        assert!(slot.avg_forward_return.iter().all(|v| *v == 0.0));
        assert!(slot.win_rate.iter().all(|v| *v == 0.0));
    }
}
