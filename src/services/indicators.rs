//! Daily momentum oscillator overlay.
//!
//! Computes a Wilder-style relative strength oscillator over daily closes,
//! two trailing averages of it, and a threshold classification of each
//! average. Values are rounded half-to-even to whole units.

use tracing::debug;

use crate::error::Result;
use crate::services::series::{ascending_order, restore_order};
use crate::types::{Highlight, IndicatorOverlay, IndicatorRecord, PriceBar};

/// Tunable parameters of the oscillator overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    /// Smoothing period. The EMA weight is `1 / period` (center of mass `period - 1`).
    pub period: usize,
    pub short_window: usize,
    pub long_window: usize,
    pub short_high: i64,
    pub short_low: i64,
    pub long_high: i64,
    pub long_low: i64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            period: 2,
            short_window: 5,
            long_window: 10,
            short_high: 90,
            short_low: 10,
            long_high: 85,
            long_low: 15,
        }
    }
}

/// Smoothed gain and loss after one step of the recurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl Smoothed {
    fn step(self, gain: f64, loss: f64, alpha: f64) -> Self {
        Self {
            avg_gain: alpha * gain + (1.0 - alpha) * self.avg_gain,
            avg_loss: alpha * loss + (1.0 - alpha) * self.avg_loss,
        }
    }

    /// Unrounded oscillator value. Saturates at 100 when there is no loss
    /// and is undefined when there is neither gain nor loss.
    pub fn oscillator(&self) -> Option<f64> {
        if self.avg_loss == 0.0 {
            return (self.avg_gain > 0.0).then_some(100.0);
        }
        let rs = self.avg_gain / self.avg_loss;
        Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
    }
}

/// Annotates a daily price series with the oscillator overlay.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    /// Compute the overlay for every bar.
    ///
    /// The output has one record per input bar, in the input's order.
    /// Series shorter than two bars come back without an overlay.
    pub fn compute(&self, series: &[PriceBar]) -> Result<Vec<IndicatorRecord>> {
        for (row, bar) in series.iter().enumerate() {
            bar.validate(row)?;
        }

        let dates: Vec<_> = series.iter().map(|b| b.date).collect();
        let order = ascending_order(&dates)?;

        if series.len() < 2 {
            return Ok(series.iter().cloned().map(IndicatorRecord::bare).collect());
        }

        let closes: Vec<f64> = order.iter().map(|&i| series[i].close).collect();
        let overlays = restore_order(&order, self.overlays(&closes));

        debug!(rows = series.len(), "computed oscillator overlay");

        Ok(series
            .iter()
            .cloned()
            .zip(overlays)
            .map(|(bar, overlay)| IndicatorRecord {
                bar,
                overlay: Some(overlay),
            })
            .collect())
    }

    /// Overlays for closes already in ascending date order.
    pub fn overlays(&self, closes: &[f64]) -> Vec<IndicatorOverlay> {
        let s = &self.settings;
        let oscillator = self.oscillator(closes);
        let avg_short = trailing_mean(&oscillator, s.short_window);
        let avg_long = trailing_mean(&oscillator, s.long_window);

        oscillator
            .into_iter()
            .zip(avg_short)
            .zip(avg_long)
            .map(|((oscillator, short), long)| IndicatorOverlay {
                oscillator,
                oscillator_avg_short: short,
                oscillator_avg_long: long,
                highlight_short: Highlight::classify(short, s.short_high, s.short_low),
                highlight_long: Highlight::classify(long, s.long_high, s.long_low),
            })
            .collect()
    }

    /// Rounded oscillator per close. The first close has no change and
    /// therefore no value.
    pub fn oscillator(&self, closes: &[f64]) -> Vec<Option<i64>> {
        self.smooth(closes)
            .into_iter()
            .map(|s| s.and_then(|s| s.oscillator()).map(round_whole))
            .collect()
    }

    /// Run the smoothing recurrence over closes in ascending date order.
    ///
    /// The first defined gain/loss pair seeds the averages directly; later
    /// steps apply `avg = alpha * x + (1 - alpha) * prev`.
    pub fn smooth(&self, closes: &[f64]) -> Vec<Option<Smoothed>> {
        let alpha = 1.0 / self.settings.period.max(1) as f64;

        let mut out = Vec::with_capacity(closes.len());
        if closes.is_empty() {
            return out;
        }
        out.push(None);
        out.extend(
            closes
                .windows(2)
                .scan(None::<Smoothed>, |state, pair| {
                    let delta = pair[1] - pair[0];
                    let gain = delta.max(0.0);
                    let loss = (-delta).max(0.0);
                    let next = match *state {
                        None => Smoothed {
                            avg_gain: gain,
                            avg_loss: loss,
                        },
                        Some(prev) => prev.step(gain, loss, alpha),
                    };
                    *state = Some(next);
                    Some(Some(next))
                }),
        );
        out
    }
}

/// Arithmetic mean of the `window` values ending at each position, rounded.
/// Undefined until a full window is available or when any value in the
/// window is undefined.
pub fn trailing_mean(values: &[Option<i64>], window: usize) -> Vec<Option<i64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sum = values[i + 1 - window..=i]
                .iter()
                .copied()
                .sum::<Option<i64>>()?;
            Some(round_whole(sum as f64 / window as f64))
        })
        .collect()
}

/// Round to the nearest whole number, ties to even.
pub fn round_whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}
