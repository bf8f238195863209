//! Picks one representative forecast entry per upcoming day.
//!
//! The upstream feed is 3-hourly. For every UTC calendar date we keep the
//! entry closest to 12:00 UTC, drop today's date and return the next three
//! days in date order.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike, Utc};

use crate::types::ForecastSample;

/// Hour of day (UTC) an entry should be closest to
pub const TARGET_HOUR: u32 = 12;

/// Maximum number of days returned
pub const FORECAST_DAYS: usize = 3;

/// Select up to [`FORECAST_DAYS`] entries, one per UTC date, skipping `today`.
///
/// Within a date the entry with the smallest distance between its UTC hour
/// and noon wins; on a tie the earlier entry in `samples` is kept. Entries
/// whose timestamp can't be represented are skipped. Input order doesn't
/// matter for the output order, which is ascending by date.
pub fn select_forecast_days(samples: &[ForecastSample], today: NaiveDate) -> Vec<ForecastSample> {
    let mut by_day: BTreeMap<NaiveDate, (u32, &ForecastSample)> = BTreeMap::new();

    for sample in samples {
        let Some(at) = sample.timestamp() else {
            continue;
        };
        let distance = at.hour().abs_diff(TARGET_HOUR);

        match by_day.entry(at.date_naive()) {
            Entry::Vacant(slot) => {
                slot.insert((distance, sample));
            }
            Entry::Occupied(mut slot) => {
                // strict: first-seen wins ties
                if distance < slot.get().0 {
                    slot.insert((distance, sample));
                }
            }
        }
    }

    by_day
        .into_iter()
        .filter(|(date, _)| *date != today)
        .take(FORECAST_DAYS)
        .map(|(_, (_, sample))| sample.clone())
        .collect()
}

/// [`select_forecast_days`] with today taken from the system clock (UTC)
pub fn select_forecast_days_now(samples: &[ForecastSample]) -> Vec<ForecastSample> {
    select_forecast_days(samples, Utc::now().date_naive())
}
