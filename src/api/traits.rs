use async_trait::async_trait;

use super::error::ClientResult;
use crate::models::{
    Booking, Listing, ListingId, NewBooking, NewTransaction, ReviewSummary, Taxonomy,
    Transaction, TransactionId, UserId,
};

/// Operations the listing detail view consumes from the market backend.
///
/// Authorized calls take the caller's login token explicitly; the view asks
/// its session for one right before each call.
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn get_listing(&self, id: ListingId) -> ClientResult<Listing>;

    /// Category groups with the tags belonging to each
    async fn get_categories(&self) -> ClientResult<Taxonomy>;

    async fn get_listing_reviews(&self, id: ListingId) -> ClientResult<ReviewSummary>;

    async fn get_user_reviews(&self, user: UserId) -> ClientResult<ReviewSummary>;

    async fn get_listing_transactions(
        &self,
        id: ListingId,
        token: &str,
    ) -> ClientResult<Vec<Transaction>>;

    /// Bookings of a listing overlapping the given month (1-12)
    async fn get_listing_bookings(
        &self,
        id: ListingId,
        year: i32,
        month: u32,
    ) -> ClientResult<Vec<Booking>>;

    async fn get_transaction_bookings(
        &self,
        id: TransactionId,
        token: &str,
    ) -> ClientResult<Vec<Booking>>;

    async fn get_seller_rating(&self, user: UserId) -> ClientResult<f64>;

    async fn create_transaction(
        &self,
        token: &str,
        transaction: &NewTransaction,
    ) -> ClientResult<TransactionId>;

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ClientResult<()>;

    async fn cancel_transaction(&self, id: TransactionId, token: &str) -> ClientResult<()>;

    async fn confirm_payment(&self, id: TransactionId, token: &str) -> ClientResult<()>;

    async fn cancel_listing(&self, id: ListingId, token: &str) -> ClientResult<()>;

    async fn mark_listing_sold(&self, id: ListingId, token: &str) -> ClientResult<()>;

    /// Name of the backend, used in logs
    fn source_name(&self) -> &'static str;
}
