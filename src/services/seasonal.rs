//! Seasonal backtest by trading day of the year.
//!
//! Every historical open is tagged with its 1-based trading-day index
//! within its year. Forward returns over 1..=15 trading days are then
//! averaged per index across all years and laid onto the reference
//! year's trading calendar.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::calendar::{validate_schedule, TradingCalendar};
use crate::services::series::ascending_order;
use crate::types::{bar::check_price, DailyOpen, SeasonalSlot, HORIZONS, HORIZON_COUNT};

/// Date label format for slots, e.g. `Jan 2, 2025`.
const LABEL_FORMAT: &str = "%b %-d, %Y";

/// A historical open tagged with its trading-day index and forward returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub trading_day_index: u32,
    /// Return to the open `HORIZONS[k]` trading days later, if the
    /// history reaches that far.
    pub forward_returns: [Option<f64>; HORIZON_COUNT],
}

/// Running totals for one trading-day index.
#[derive(Debug, Clone, Default)]
struct SlotTotals {
    rows: u32,
    sums: [f64; HORIZON_COUNT],
    wins: [u32; HORIZON_COUNT],
    counts: [u32; HORIZON_COUNT],
}

impl SlotTotals {
    fn add(&mut self, obs: &Observation) {
        self.rows += 1;
        for (k, ret) in obs.forward_returns.iter().enumerate() {
            if let Some(r) = *ret {
                self.sums[k] += r;
                self.counts[k] += 1;
                if r > 0.0 {
                    self.wins[k] += 1;
                }
            }
        }
    }

    fn into_slot(self, trading_day_index: u32, label: String) -> SeasonalSlot {
        let mut slot = SeasonalSlot::empty(trading_day_index, label);
        slot.sample_count = self.rows;
        for k in 0..HORIZON_COUNT {
            let n = self.counts[k];
            slot.horizon_samples[k] = n;
            if n > 0 {
                slot.avg_forward_return[k] = self.sums[k] / f64::from(n);
                slot.win_rate[k] = f64::from(self.wins[k]) / f64::from(n);
            }
        }
        slot
    }
}

/// Aggregates forward returns by trading day of the year.
#[derive(Clone)]
pub struct SeasonalAggregator {
    calendar: Arc<dyn TradingCalendar>,
}

impl SeasonalAggregator {
    pub fn new(calendar: Arc<dyn TradingCalendar>) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Arc<dyn TradingCalendar> {
        &self.calendar
    }

    /// One slot per trading day of `reference_year`, in index order.
    ///
    /// Fails with `NoData` on an empty series and `CalendarUnavailable`
    /// when the calendar cannot supply a complete schedule.
    pub fn aggregate(&self, series: &[DailyOpen], reference_year: i32) -> Result<Vec<SeasonalSlot>> {
        if series.is_empty() {
            return Err(AppError::NoData(
                "seasonal aggregation needs at least one price row".to_string(),
            ));
        }

        let observations = observe(series)?;
        let groups = group_by_index(&observations);

        let schedule = self.calendar.schedule(reference_year)?;
        validate_schedule(reference_year, &schedule)?;

        let surplus = groups
            .iter()
            .filter(|(idx, _)| *idx as usize > schedule.len())
            .count();
        if surplus > 0 {
            debug!(
                surplus,
                reference_year,
                "dropping trading-day groups beyond the reference calendar"
            );
        }

        let slots = reconcile(groups.into_iter().peekable(), &schedule);
        debug!(
            rows = series.len(),
            slots = slots.len(),
            calendar = self.calendar.name(),
            "aggregated seasonal slots"
        );
        Ok(slots)
    }
}

/// Sort the series, index each row within its year, and compute forward
/// returns across the whole history.
pub fn observe(series: &[DailyOpen]) -> Result<Vec<Observation>> {
    for (row, bar) in series.iter().enumerate() {
        check_price(row, "open", bar.open)?;
    }

    let dates: Vec<NaiveDate> = series.iter().map(|b| b.date).collect();
    let order = ascending_order(&dates)?;
    let opens: Vec<f64> = order.iter().map(|&i| series[i].open).collect();

    let mut observations = Vec::with_capacity(order.len());
    let mut current_year = None;
    let mut index = 0u32;

    for (pos, &row) in order.iter().enumerate() {
        let date = series[row].date;
        if current_year != Some(date.year()) {
            current_year = Some(date.year());
            index = 0;
        }
        index += 1;

        let mut forward_returns = [None; HORIZON_COUNT];
        for (k, &h) in HORIZONS.iter().enumerate() {
            forward_returns[k] = opens
                .get(pos + h)
                .map(|later| (later - opens[pos]) / opens[pos]);
        }

        observations.push(Observation {
            date,
            trading_day_index: index,
            forward_returns,
        });
    }

    Ok(observations)
}

/// Totals per trading-day index, ascending by index.
fn group_by_index(observations: &[Observation]) -> Vec<(u32, SlotTotals)> {
    let mut groups: BTreeMap<u32, SlotTotals> = BTreeMap::new();
    for obs in observations {
        groups.entry(obs.trading_day_index).or_default().add(obs);
    }
    groups.into_iter().collect()
}

/// Left-join the canonical indices `1..=schedule.len()` against the
/// computed groups. Both sides are ascending, so each group is consumed
/// at most once and indices without a group become empty slots.
fn reconcile<I>(mut groups: Peekable<I>, schedule: &[NaiveDate]) -> Vec<SeasonalSlot>
where
    I: Iterator<Item = (u32, SlotTotals)>,
{
    schedule
        .iter()
        .zip(1u32..)
        .map(|(date, idx)| {
            let label = date.format(LABEL_FORMAT).to_string();
            while groups.next_if(|(g, _)| *g < idx).is_some() {}
            match groups.next_if(|(g, _)| *g == idx) {
                Some((_, totals)) => totals.into_slot(idx, label),
                None => SeasonalSlot::empty(idx, label),
            }
        })
        .collect()
}
