use serde::{Deserialize, Serialize};

use crate::models::{Booking, Transaction, TransactionId};

/// `{"transactions": [...]}`
#[derive(Debug, Deserialize)]
pub struct TransactionsEnvelope {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// `{"bookings": [...]}`
#[derive(Debug, Deserialize)]
pub struct BookingsEnvelope {
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
pub struct RatingEnvelope {
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTransaction {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
}

/// Error body returned by the backend on non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Query of the monthly bookings endpoint
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}
