//! Ordering helpers shared by the analytics engines.

use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// Positions of `dates` in ascending date order.
///
/// Fails with a validation error naming the later of two rows that share
/// a date.
pub fn ascending_order(dates: &[NaiveDate]) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&i| (dates[i], i));

    for pair in order.windows(2) {
        if dates[pair[0]] == dates[pair[1]] {
            return Err(AppError::validation(
                pair[0].max(pair[1]),
                format!("duplicate date {}", dates[pair[1]]),
            ));
        }
    }

    Ok(order)
}

/// Scatter values computed in sorted order back to the caller's positions.
pub fn restore_order<T: Clone + Default>(order: &[usize], sorted: Vec<T>) -> Vec<T> {
    let mut out = vec![T::default(); order.len()];
    for (value, &row) in sorted.into_iter().zip(order) {
        out[row] = value;
    }
    out
}
