use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListingId, ReviewSummary, TransactionId, UserId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Paid,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    #[serde(rename = "customerID")]
    pub customer_id: UserId,
    #[serde(rename = "listingID")]
    pub listing_id: ListingId,
    pub status: TransactionStatus,
    #[serde(default)]
    pub number_of_assets: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A transaction as shown to the listing owner: enriched with what is known
/// about the customer and the bookings it holds.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionEntry {
    pub transaction: Transaction,
    pub customer_reviews: Option<ReviewSummary>,
    pub bookings: Vec<Booking>,
}

impl TransactionEntry {
    pub fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            customer_reviews: None,
            bookings: Vec::new(),
        }
    }
}

/// Calendar reservation tied to a transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "bookingID", default)]
    pub booking_id: Option<i64>,
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

impl Booking {
    /// Both ends of the date range are occupied
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Raw values of the purchase form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub number_of_assets: Option<u32>,
    pub address: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(rename = "listingID")]
    pub listing_id: ListingId,
    pub number_of_assets: Option<u32>,
    pub address: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl NewTransaction {
    pub fn from_form(listing_id: ListingId, form: TransactionForm) -> Self {
        Self {
            listing_id,
            number_of_assets: form.number_of_assets,
            address: form.address,
            date: form.date,
            time: form.time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}
