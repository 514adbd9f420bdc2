//! Booking calendar: occupied-date highlighting and date selection.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use tracing::debug;

use crate::api::{ClientError, ClientResult, MarketApi};
use crate::models::{Booking, ListingId, NewBooking, TransactionId};

/// `(year, month)` with month in 1..=12
pub type MonthKey = (i32, u32);

pub fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

/// A selected start date, closed once an end date after it is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn at(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Days between start and end of a closed range
    pub fn day_count(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_days())
    }
}

/// Month-keyed cache of a listing's bookings plus the visitor's selection
#[derive(Debug, Default)]
pub struct BookingCalendar {
    months: HashMap<MonthKey, Vec<Booking>>,
    selection: Option<DateRange>,
}

impl BookingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cached(&self, key: MonthKey) -> bool {
        self.months.contains_key(&key)
    }

    pub fn insert_month(&mut self, key: MonthKey, bookings: Vec<Booking>) {
        self.months.insert(key, bookings);
    }

    /// Fetch the bookings of `key` unless that month is already cached
    pub async fn ensure_month(
        &mut self,
        api: &dyn MarketApi,
        listing_id: ListingId,
        key: MonthKey,
    ) -> ClientResult<()> {
        if self.is_cached(key) {
            return Ok(());
        }
        let (year, month) = key;
        let bookings = api.get_listing_bookings(listing_id, year, month).await?;
        debug!(
            "Cached {} bookings for listing {} in {}-{:02}",
            bookings.len(),
            listing_id,
            year,
            month
        );
        self.insert_month(key, bookings);
        Ok(())
    }

    pub fn invalidate(&mut self, key: MonthKey) {
        self.months.remove(&key);
    }

    /// Drop every cached month touched by `start..=end`
    pub fn invalidate_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let mut key = month_key(start);
        let last = month_key(end.max(start));
        while key <= last {
            self.invalidate(key);
            key = next_month(key);
        }
    }

    /// Forget all cached months and the selection
    pub fn clear(&mut self) {
        self.months.clear();
        self.selection = None;
    }

    pub fn is_occupied(&self, date: NaiveDate) -> bool {
        self.months
            .values()
            .flatten()
            .any(|booking| booking.covers(date))
    }

    /// Register a click on `date`.
    ///
    /// Completes an open range when `date` lies after its start; every other
    /// click starts a new open range.
    pub fn select(&mut self, date: NaiveDate) {
        self.selection = match self.selection {
            Some(DateRange { start, end: None }) if date > start => Some(DateRange {
                start,
                end: Some(date),
            }),
            _ => Some(DateRange::at(date)),
        };
    }

    pub fn selection(&self) -> Option<DateRange> {
        self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

fn next_month((year, month): MonthKey) -> MonthKey {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Booking slot computed from the visitor's selection, before the
/// transaction it belongs to exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Days or hours bought
    pub quantity: u32,
}

impl BookingRequest {
    /// Day-priced booking over a closed range
    pub fn daily(range: DateRange) -> ClientResult<Self> {
        let end = range
            .end
            .ok_or_else(|| ClientError::Validation("Select an end date".to_string()))?;
        let days = (end - range.start).num_days();
        let quantity = u32::try_from(days)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| ClientError::Validation("End date must be after start date".to_string()))?;

        Ok(Self {
            start_date: range.start,
            end_date: end,
            start_time: None,
            end_time: None,
            quantity,
        })
    }

    /// Hour-priced booking starting at `date` `time`; may end on the next day
    pub fn hourly(date: NaiveDate, time: NaiveTime, hours: u32) -> ClientResult<Self> {
        if hours == 0 {
            return Err(ClientError::Validation(
                "Enter a number of hours".to_string(),
            ));
        }
        let start = NaiveDateTime::new(date, time);
        let end = start
            .checked_add_signed(Duration::hours(i64::from(hours)))
            .ok_or_else(|| ClientError::Validation("Booking ends out of range".to_string()))?;

        Ok(Self {
            start_date: date,
            end_date: end.date(),
            start_time: Some(time),
            end_time: Some(end.time()),
            quantity: hours,
        })
    }

    pub fn for_transaction(&self, transaction_id: TransactionId) -> NewBooking {
        NewBooking {
            transaction_id,
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}
