//! Day segmentation of time series for charting.
//!
//! Buckets are views into the caller's slice; a new series means a new
//! segmentation, nothing is updated in place.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use explicasurf_core::Locale;
use serde::Serialize;

use crate::types::Timestamped;

/// Contiguous samples sharing one calendar day in the display clock.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket<'a, T> {
    pub day: NaiveDate,
    /// Index of the bucket's first sample in the whole series
    pub start_index: usize,
    pub samples: &'a [T],
}

impl<T> DayBucket<'_, T> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Legend text for the bucket: weekday name and `dd/mm`.
    pub fn legend(&self, locale: Locale) -> (&'static str, String) {
        (
            weekday_name(self.day.weekday(), locale),
            self.day.format("%d/%m").to_string(),
        )
    }
}

/// Marker drawn where a new day starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBoundary {
    pub day: NaiveDate,
    /// Timestamp of the first sample of `day`
    pub at: DateTime<Utc>,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedSeries<'a, T> {
    pub buckets: Vec<DayBucket<'a, T>>,
    /// One per day transition, so always `buckets.len() - 1` when non-empty
    pub boundaries: Vec<DayBoundary>,
    /// Sample closest to "now"
    pub nearest_now: Option<usize>,
    /// Per sample: does it open a day?
    pub first_of_day: Vec<bool>,
}

impl<T> SegmentedSeries<'_, T> {
    pub fn is_first_of_day(&self, index: usize) -> bool {
        self.first_of_day.get(index).copied().unwrap_or(false)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.iter().map(|b| b.day)
    }
}

/// Split `samples` into calendar-day buckets in the `offset` clock.
///
/// A bucket starts at every sample whose date differs from its predecessor's.
/// Sampling may be irregular; an empty series yields no buckets.
pub fn segment_by_day<T: Timestamped>(
    samples: &[T],
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> SegmentedSeries<'_, T> {
    let mut buckets = Vec::new();
    let mut boundaries = Vec::new();
    let mut first_of_day = Vec::with_capacity(samples.len());

    let mut current: Option<(NaiveDate, usize)> = None;

    for (index, sample) in samples.iter().enumerate() {
        let day = local_day(sample.timestamp(), offset);

        match current {
            Some((open_day, _)) if open_day == day => first_of_day.push(false),
            previous => {
                if let Some((open_day, start)) = previous {
                    buckets.push(DayBucket {
                        day: open_day,
                        start_index: start,
                        samples: &samples[start..index],
                    });
                    boundaries.push(DayBoundary {
                        day,
                        at: sample.timestamp(),
                        index,
                    });
                }
                current = Some((day, index));
                first_of_day.push(true);
            }
        }
    }

    if let Some((open_day, start)) = current {
        buckets.push(DayBucket {
            day: open_day,
            start_index: start,
            samples: &samples[start..],
        });
    }

    SegmentedSeries {
        buckets,
        boundaries,
        nearest_now: nearest_to(samples, now),
        first_of_day,
    }
}

/// Index of the sample closest to `now`; on a tie the earlier sample wins.
pub fn nearest_to<T: Timestamped>(samples: &[T], now: DateTime<Utc>) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| (s.timestamp() - now).abs())
        .map(|(i, _)| i)
}

fn local_day(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

fn weekday_name(day: Weekday, locale: Locale) -> &'static str {
    let index = day.num_days_from_monday() as usize;
    match locale {
        Locale::PtBr => [
            "segunda-feira",
            "terça-feira",
            "quarta-feira",
            "quinta-feira",
            "sexta-feira",
            "sábado",
            "domingo",
        ][index],
        Locale::En => [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ][index],
    }
}
