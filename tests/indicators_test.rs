//! Integration tests for the oscillator overlay

use almanac::services::{IndicatorEngine, IndicatorSettings};
use almanac::types::{Highlight, PriceBar};
use chrono::{Duration, NaiveDate};

fn series(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 10_000 + i as u64,
        })
        .collect()
}

#[test]
fn test_rising_series_is_high() {
    let closes: Vec<f64> = (1..=12).map(|c| c as f64 * 10.0).collect();
    let records = IndicatorEngine::default().compute(&series(&closes)).unwrap();

    assert_eq!(records.len(), 12);
    assert_eq!(records[0].oscillator(), None);
    assert!(records[1..].iter().all(|r| r.oscillator() == Some(100)));

    // First full short window without a null is rows 1..=5.
    assert_eq!(records[4].avg_short(), None);
    assert_eq!(records[5].avg_short(), Some(100));
    assert_eq!(records[9].avg_long(), None);
    assert_eq!(records[10].avg_long(), Some(100));

    let overlay = records[11].overlay.as_ref().unwrap();
    assert_eq!(overlay.highlight_short, Highlight::High);
    assert_eq!(overlay.highlight_long, Highlight::High);

    let early = records[3].overlay.as_ref().unwrap();
    assert_eq!(early.highlight_short, Highlight::None);
    assert_eq!(early.highlight_long, Highlight::None);
}

#[test]
fn test_falling_series_is_low() {
    let closes: Vec<f64> = (1..=12).rev().map(|c| c as f64).collect();
    let records = IndicatorEngine::default().compute(&series(&closes)).unwrap();

    assert!(records[1..].iter().all(|r| r.oscillator() == Some(0)));
    let last = records[11].overlay.as_ref().unwrap();
    assert_eq!(last.highlight_short, Highlight::Low);
    assert_eq!(last.highlight_long, Highlight::Low);
}

#[test]
fn test_recurrence_values() {
    let records = IndicatorEngine::default()
        .compute(&series(&[10.0, 12.0, 9.0, 10.0]))
        .unwrap();
    let values: Vec<_> = records.iter().map(|r| r.oscillator()).collect();
    // gains 2, 0, 1 and losses 0, 3, 0 smoothed with weight 1/2
    assert_eq!(values, vec![None, Some(100), Some(40), Some(57)]);
}

#[test]
fn test_output_follows_input_order() {
    let mut bars = series(&[10.0, 12.0, 9.0, 10.0]);
    bars.swap(0, 3);
    bars.swap(1, 2);

    let records = IndicatorEngine::default().compute(&bars).unwrap();
    let dates: Vec<_> = records.iter().map(|r| r.bar.date).collect();
    let expected: Vec<_> = bars.iter().map(|b| b.date).collect();
    assert_eq!(dates, expected);

    let values: Vec<_> = records.iter().map(|r| r.oscillator()).collect();
    assert_eq!(values, vec![Some(57), Some(40), Some(100), None]);
}

#[test]
fn test_duplicate_dates_rejected() {
    let mut bars = series(&[10.0, 11.0, 12.0]);
    bars[2].date = bars[0].date;

    let err = IndicatorEngine::default().compute(&bars).unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[test]
fn test_single_bar_has_no_overlay() {
    let records = IndicatorEngine::default().compute(&series(&[42.0])).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].overlay.is_none());

    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 6);
    assert!(json.get("oscillator").is_none());
}

#[test]
fn test_record_json_shape() {
    let closes: Vec<f64> = (1..=6).map(|c| c as f64).collect();
    let records = IndicatorEngine::default().compute(&series(&closes)).unwrap();

    let first = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(first["date"], "2024-03-01");
    assert!(first["oscillator"].is_null());
    assert!(first["oscillator_avg_short"].is_null());
    assert_eq!(first["highlight_short"], "none");

    let last = serde_json::to_value(&records[5]).unwrap();
    assert_eq!(last["oscillator"], 100);
    assert_eq!(last["oscillator_avg_short"], 100);
    assert_eq!(last["highlight_short"], "high");
    assert!(last["oscillator_avg_long"].is_null());
    assert_eq!(last["highlight_long"], "none");
}

#[test]
fn test_threshold_boundaries() {
    let s = IndicatorSettings::default();
    assert_eq!(Highlight::classify(Some(90), s.short_high, s.short_low), Highlight::High);
    assert_eq!(Highlight::classify(Some(89), s.short_high, s.short_low), Highlight::None);
    assert_eq!(Highlight::classify(Some(10), s.short_high, s.short_low), Highlight::Low);
    assert_eq!(Highlight::classify(Some(85), s.long_high, s.long_low), Highlight::High);
    assert_eq!(Highlight::classify(Some(16), s.long_high, s.long_low), Highlight::None);
    assert_eq!(Highlight::classify(Some(15), s.long_high, s.long_low), Highlight::Low);
    assert_eq!(Highlight::classify(None, s.long_high, s.long_low), Highlight::None);
}

#[test]
fn test_mixed_series_is_bounded_and_repeatable() {
    let mut close = 100.0;
    let closes: Vec<f64> = (0..30)
        .map(|i| {
            let swing = ((i % 7) + 1) as f64;
            close += if i % 2 == 0 { swing } else { -swing };
            close
        })
        .collect();
    let bars = series(&closes);
    let engine = IndicatorEngine::default();

    let first = engine.compute(&bars).unwrap();
    let second = engine.compute(&bars).unwrap();
    assert_eq!(first, second);

    assert!(first.iter().skip(1).all(|r| r.oscillator().is_some()));
    for record in &first {
        if let Some(value) = record.oscillator() {
            assert!((0..=100).contains(&value), "{} out of range", value);
        }
        for avg in [record.avg_short(), record.avg_long()].into_iter().flatten() {
            assert!((0..=100).contains(&avg));
        }
    }
}
