use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{ClientError, ClientResult};
use super::traits::MarketApi;
use super::types::{
    BookingsEnvelope, CreatedTransaction, ErrorBody, MonthQuery, RatingEnvelope,
    TransactionsEnvelope,
};
use crate::config::Config;
use crate::models::{
    Booking, Listing, ListingId, NewBooking, NewTransaction, ReviewSummary, Taxonomy,
    Transaction, TransactionId, UserId,
};

/// Routes of the market REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Listing(ListingId),
    Categories,
    ListingReviews(ListingId),
    UserReviews(UserId),
    ListingTransactions(ListingId),
    ListingBookings { id: ListingId, year: i32, month: u32 },
    TransactionBookings(TransactionId),
    SellerRating(UserId),
    CreateTransaction,
    CreateBooking,
    CancelTransaction(TransactionId),
    ConfirmPayment(TransactionId),
    CancelListing(ListingId),
    MarkSold(ListingId),
}

impl Endpoint {
    fn method(&self) -> Method {
        match self {
            Endpoint::CreateTransaction
            | Endpoint::CreateBooking
            | Endpoint::CancelTransaction(_)
            | Endpoint::ConfirmPayment(_)
            | Endpoint::CancelListing(_)
            | Endpoint::MarkSold(_) => Method::POST,
            _ => Method::GET,
        }
    }

    fn path(&self) -> String {
        match self {
            Endpoint::Listing(id) => format!("listings/{}", id),
            Endpoint::Categories => "categories".to_string(),
            Endpoint::ListingReviews(id) => format!("listings/{}/reviews", id),
            Endpoint::UserReviews(user) => format!("users/{}/reviews", user),
            Endpoint::ListingTransactions(id) => format!("listings/{}/transactions", id),
            Endpoint::ListingBookings { id, .. } => format!("listings/{}/bookings", id),
            Endpoint::TransactionBookings(id) => format!("transactions/{}/bookings", id),
            Endpoint::SellerRating(user) => format!("users/{}/rating", user),
            Endpoint::CreateTransaction => "transactions".to_string(),
            Endpoint::CreateBooking => "bookings".to_string(),
            Endpoint::CancelTransaction(id) => format!("transactions/{}/cancel", id),
            Endpoint::ConfirmPayment(id) => format!("transactions/{}/confirm-payment", id),
            Endpoint::CancelListing(id) => format!("listings/{}/cancel", id),
            Endpoint::MarkSold(id) => format!("listings/{}/sold", id),
        }
    }
}

/// Market backend reached over its JSON REST API
#[derive(Debug, Clone)]
pub struct HttpMarketApi {
    client: Client,
    base_url: String,
}

impl HttpMarketApi {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Request for `endpoint`, with a bearer token when one is given
    fn request(&self, endpoint: Endpoint, token: Option<&str>) -> RequestBuilder {
        let url = self.url(&endpoint.path());
        debug!("{} {}", endpoint.method(), url);
        let mut request = self.client.request(endpoint.method(), &url);
        if let Endpoint::ListingBookings { year, month, .. } = endpoint {
            request = request.query(&MonthQuery { year, month });
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let response = self.request(endpoint, token).send().await?;
        let response = Self::check(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        token: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let mut request = self.request(endpoint, Some(token));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::check(response).await
    }

    async fn post_empty(&self, endpoint: Endpoint, token: &str) -> ClientResult<()> {
        self.post::<()>(endpoint, token, None).await.map(|_| ())
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        warn!("Market API returned status: {}", status);
        Err(error_from_body(status, &body))
    }
}

/// Join the base URL and an endpoint path with exactly one slash
fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a non-success response to an error, keeping the backend's message
/// when the body carries one.
fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(b) => Some(b.message),
        Err(_) => Some(body.trim().to_string()).filter(|text| !text.is_empty()),
    };
    match message {
        Some(message) => ClientError::Api { status, message },
        None if status == StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        None => ClientError::Api {
            status,
            message: status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        },
    }
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn get_listing(&self, id: ListingId) -> ClientResult<Listing> {
        self.fetch(Endpoint::Listing(id), None).await
    }

    async fn get_categories(&self) -> ClientResult<Taxonomy> {
        self.fetch(Endpoint::Categories, None).await
    }

    async fn get_listing_reviews(&self, id: ListingId) -> ClientResult<ReviewSummary> {
        self.fetch(Endpoint::ListingReviews(id), None).await
    }

    async fn get_user_reviews(&self, user: UserId) -> ClientResult<ReviewSummary> {
        self.fetch(Endpoint::UserReviews(user), None).await
    }

    async fn get_listing_transactions(
        &self,
        id: ListingId,
        token: &str,
    ) -> ClientResult<Vec<Transaction>> {
        let envelope: TransactionsEnvelope = self
            .fetch(Endpoint::ListingTransactions(id), Some(token))
            .await?;
        Ok(envelope.transactions)
    }

    async fn get_listing_bookings(
        &self,
        id: ListingId,
        year: i32,
        month: u32,
    ) -> ClientResult<Vec<Booking>> {
        let envelope: BookingsEnvelope = self
            .fetch(Endpoint::ListingBookings { id, year, month }, None)
            .await?;
        Ok(envelope.bookings)
    }

    async fn get_transaction_bookings(
        &self,
        id: TransactionId,
        token: &str,
    ) -> ClientResult<Vec<Booking>> {
        let envelope: BookingsEnvelope = self
            .fetch(Endpoint::TransactionBookings(id), Some(token))
            .await?;
        Ok(envelope.bookings)
    }

    async fn get_seller_rating(&self, user: UserId) -> ClientResult<f64> {
        let rating: RatingEnvelope = self.fetch(Endpoint::SellerRating(user), None).await?;
        Ok(rating.score)
    }

    async fn create_transaction(
        &self,
        token: &str,
        transaction: &NewTransaction,
    ) -> ClientResult<TransactionId> {
        let response = self
            .post(Endpoint::CreateTransaction, token, Some(transaction))
            .await?;
        let body = response.text().await?;
        let created: CreatedTransaction = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(created.transaction_id)
    }

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ClientResult<()> {
        self.post(Endpoint::CreateBooking, token, Some(booking))
            .await
            .map(|_| ())
    }

    async fn cancel_transaction(&self, id: TransactionId, token: &str) -> ClientResult<()> {
        self.post_empty(Endpoint::CancelTransaction(id), token).await
    }

    async fn confirm_payment(&self, id: TransactionId, token: &str) -> ClientResult<()> {
        self.post_empty(Endpoint::ConfirmPayment(id), token).await
    }

    async fn cancel_listing(&self, id: ListingId, token: &str) -> ClientResult<()> {
        self.post_empty(Endpoint::CancelListing(id), token).await
    }

    async fn mark_listing_sold(&self, id: ListingId, token: &str) -> ClientResult<()> {
        self.post_empty(Endpoint::MarkSold(id), token).await
    }

    fn source_name(&self) -> &'static str {
        "market-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn api() -> HttpMarketApi {
        HttpMarketApi::new(&Config::default().with_base_url("http://example.test/api/")).unwrap()
    }

    fn build(endpoint: Endpoint, token: Option<&str>) -> reqwest::Request {
        api().request(endpoint, token).build().unwrap()
    }

    #[test]
    fn test_join_url_single_slash() {
        assert_eq!(
            join_url("http://localhost:3000/api/", "/listings/4"),
            "http://localhost:3000/api/listings/4"
        );
        assert_eq!(
            join_url("http://localhost:3000/api", "categories"),
            "http://localhost:3000/api/categories"
        );
    }

    #[test]
    fn test_error_from_body_uses_backend_message() {
        let err = error_from_body(StatusCode::BAD_REQUEST, r#"{"message":"Listing not active"}"#);
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Listing not active");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_from_body_falls_back_to_text_or_reason() {
        let err = error_from_body(StatusCode::NOT_FOUND, "no such listing");
        assert_eq!(err.to_string(), "no such listing");

        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn test_unauthorized_keeps_backend_message() {
        let err = error_from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Token expired, please log in again"}"#,
        );
        assert_eq!(err.to_string(), "Token expired, please log in again");
        assert!(matches!(
            err,
            ClientError::Api { status, .. } if status == StatusCode::UNAUTHORIZED
        ));

        let err = error_from_body(StatusCode::UNAUTHORIZED, "  ");
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(err.to_string(), "Authentication required");
    }

    #[test]
    fn test_client_builds_from_config() {
        let api = api();
        assert_eq!(api.url("listings/1"), "http://example.test/api/listings/1");
        assert_eq!(api.source_name(), "market-http");
    }

    #[test]
    fn test_public_reads_are_unauthenticated_gets() {
        let cases = [
            (Endpoint::Listing(4), "http://example.test/api/listings/4"),
            (Endpoint::Categories, "http://example.test/api/categories"),
            (
                Endpoint::ListingReviews(4),
                "http://example.test/api/listings/4/reviews",
            ),
            (
                Endpoint::UserReviews(9),
                "http://example.test/api/users/9/reviews",
            ),
            (
                Endpoint::SellerRating(9),
                "http://example.test/api/users/9/rating",
            ),
        ];
        for (endpoint, url) in cases {
            let request = build(endpoint, None);
            assert_eq!(request.method(), Method::GET);
            assert_eq!(request.url().as_str(), url);
            assert!(request.headers().get(AUTHORIZATION).is_none());
        }
    }

    #[test]
    fn test_authorized_reads_carry_bearer_token() {
        let cases = [
            (
                Endpoint::ListingTransactions(4),
                "http://example.test/api/listings/4/transactions",
            ),
            (
                Endpoint::TransactionBookings(41),
                "http://example.test/api/transactions/41/bookings",
            ),
        ];
        for (endpoint, url) in cases {
            let request = build(endpoint, Some("s3cret"));
            assert_eq!(request.method(), Method::GET);
            assert_eq!(request.url().as_str(), url);
            assert_eq!(request.headers()[AUTHORIZATION], "Bearer s3cret");
        }
    }

    #[test]
    fn test_monthly_bookings_query() {
        let request = build(
            Endpoint::ListingBookings {
                id: 4,
                year: 2024,
                month: 5,
            },
            None,
        );
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/api/listings/4/bookings");
        assert_eq!(request.url().query(), Some("year=2024&month=5"));
    }

    #[test]
    fn test_actions_are_authorized_posts() {
        let cases = [
            (
                Endpoint::CreateTransaction,
                "http://example.test/api/transactions",
            ),
            (Endpoint::CreateBooking, "http://example.test/api/bookings"),
            (
                Endpoint::CancelTransaction(41),
                "http://example.test/api/transactions/41/cancel",
            ),
            (
                Endpoint::ConfirmPayment(41),
                "http://example.test/api/transactions/41/confirm-payment",
            ),
            (
                Endpoint::CancelListing(4),
                "http://example.test/api/listings/4/cancel",
            ),
            (
                Endpoint::MarkSold(4),
                "http://example.test/api/listings/4/sold",
            ),
        ];
        for (endpoint, url) in cases {
            let request = build(endpoint, Some("s3cret"));
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.url().as_str(), url);
            assert_eq!(request.headers()[AUTHORIZATION], "Bearer s3cret");
        }
    }
}
