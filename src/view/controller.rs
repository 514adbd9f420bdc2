use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::calendar::{month_key, BookingCalendar, BookingRequest, DateRange};
use super::host::{Route, Section, Session, ViewHost};
use super::tracker::{LoadTicket, LoadTracker};
use crate::api::{ClientError, ClientResult, MarketApi};
use crate::config::Config;
use crate::models::{
    ListingId, ListingStatus, ListingView, NewTransaction, ReviewSummary, TimeUnit,
    TransactionEntry, TransactionForm, TransactionId,
};

/// Parameters of the route that opened the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    pub id: ListingId,
    /// Section to scroll to once everything is loaded
    pub section: Option<String>,
}

impl RouteParams {
    pub fn new(id: ListingId) -> Self {
        Self { id, section: None }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// Transactions of the listing with whatever enrichment could be fetched
struct TransactionsLoad {
    entries: Vec<TransactionEntry>,
    enrichment_error: Option<ClientError>,
}

/// View state of the listing detail screen.
///
/// Methods take `&mut self`, so one activation or action runs to completion
/// before the next starts.
pub struct ListingDetail {
    api: Arc<dyn MarketApi>,
    session: Arc<dyn Session>,
    host: Arc<dyn ViewHost>,
    scroll_delay: Duration,

    listing: Option<ListingView>,
    reviews: ReviewSummary,
    seller_rating: Option<f64>,
    transactions: Vec<TransactionEntry>,
    calendar: BookingCalendar,
    tracker: LoadTracker,
    requested_section: Option<Section>,
    revealed_section: Option<Section>,
    error: Option<String>,
}

impl ListingDetail {
    pub fn new(
        api: Arc<dyn MarketApi>,
        session: Arc<dyn Session>,
        host: Arc<dyn ViewHost>,
        config: &Config,
    ) -> Self {
        Self {
            api,
            session,
            host,
            scroll_delay: config.scroll_delay(),
            listing: None,
            reviews: ReviewSummary::default(),
            seller_rating: None,
            transactions: Vec::new(),
            calendar: BookingCalendar::new(),
            tracker: LoadTracker::new(),
            requested_section: None,
            revealed_section: None,
            error: None,
        }
    }

    pub fn listing(&self) -> Option<&ListingView> {
        self.listing.as_ref()
    }

    pub fn reviews(&self) -> &ReviewSummary {
        &self.reviews
    }

    pub fn seller_rating(&self) -> Option<f64> {
        self.seller_rating
    }

    pub fn transactions(&self) -> &[TransactionEntry] {
        &self.transactions
    }

    pub fn calendar(&self) -> &BookingCalendar {
        &self.calendar
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of loads still in flight
    pub fn pending_loads(&self) -> usize {
        self.tracker.pending()
    }

    /// Section currently shown; nothing is shown while loads are pending
    pub fn revealed_section(&self) -> Option<Section> {
        if self.tracker.is_idle() {
            self.revealed_section
        } else {
            None
        }
    }

    pub fn is_owner(&self) -> bool {
        self.listing
            .as_ref()
            .is_some_and(|view| view.listing.is_owned_by(self.session.user_id()))
    }

    /// Load everything the view shows for the routed listing
    pub async fn activate(&mut self, params: RouteParams) {
        self.reset();
        self.requested_section = params.section.as_deref().and_then(|s| match s.parse() {
            Ok(section) => Some(section),
            Err(e) => {
                debug!("Ignoring route section: {}", e);
                None
            }
        });
        info!("Opening listing {} from {}", params.id, self.api.source_name());

        let ticket = self.tracker.begin("listing");
        match self.fetch_listing_view(params.id).await {
            Ok(view) => {
                debug!(
                    "Listing {} has {} category groups",
                    view.listing.listing_id,
                    view.category_groups.len()
                );
                self.listing = Some(view);
                self.load_details(ticket).await;
            }
            Err(e) => {
                self.fail(e);
                self.finish(ticket).await;
            }
        }
    }

    fn reset(&mut self) {
        self.listing = None;
        self.reviews = ReviewSummary::default();
        self.seller_rating = None;
        self.transactions.clear();
        self.calendar.clear();
        self.requested_section = None;
        self.revealed_section = None;
        self.error = None;
    }

    async fn fetch_listing_view(&self, id: ListingId) -> ClientResult<ListingView> {
        let listing = self.api.get_listing(id).await?;
        let taxonomy = self.api.get_categories().await?;
        Ok(ListingView::new(listing, &taxonomy))
    }

    /// Reviews for everyone; transactions and the seller rating for the owner.
    ///
    /// Dependent tickets are taken before `parent` settles, so the tracker
    /// only hits zero after the last of them.
    async fn load_details(&mut self, parent: LoadTicket) {
        let user = self.session.user_id();
        let (listing_id, owner_id, bookable, owner) = match &self.listing {
            Some(view) => (
                view.listing.listing_id,
                view.listing.user_id,
                view.listing.is_bookable(),
                view.listing.is_owned_by(user),
            ),
            None => {
                self.finish(parent).await;
                return;
            }
        };

        let reviews_ticket = self.tracker.begin("reviews");
        let transactions_ticket = owner.then(|| self.tracker.begin("transactions"));
        let rating_ticket = owner.then(|| self.tracker.begin("seller rating"));
        self.finish(parent).await;

        let api = Arc::clone(&self.api);
        let token = self.session.login_token();
        let (reviews, transactions, rating) = tokio::join!(
            api.get_listing_reviews(listing_id),
            async {
                if owner {
                    Some(fetch_transactions(api.as_ref(), listing_id, token, bookable).await)
                } else {
                    None
                }
            },
            async {
                if owner {
                    Some(api.get_seller_rating(owner_id).await)
                } else {
                    None
                }
            },
        );

        match reviews {
            Ok(reviews) => {
                debug!("Loaded {} reviews", reviews.reviews.len());
                self.reviews = reviews;
            }
            Err(e) => self.fail(e),
        }
        self.finish(reviews_ticket).await;

        if let Some(ticket) = transactions_ticket {
            if let Some(result) = transactions {
                self.apply_transactions(result);
            }
            self.finish(ticket).await;
        }

        if let Some(ticket) = rating_ticket {
            match rating {
                Some(Ok(score)) => self.seller_rating = Some(score),
                Some(Err(e)) => self.fail(e),
                None => {}
            }
            self.finish(ticket).await;
        }
    }

    /// Refetch the listing's transactions, e.g. after one changed state
    pub async fn load_transactions(&mut self) {
        let (listing_id, bookable) = match &self.listing {
            Some(view) => (view.listing.listing_id, view.listing.is_bookable()),
            None => return,
        };

        let ticket = self.tracker.begin("transactions");
        let result = fetch_transactions(
            self.api.as_ref(),
            listing_id,
            self.session.login_token(),
            bookable,
        )
        .await;
        self.apply_transactions(result);
        self.finish(ticket).await;
    }

    fn apply_transactions(&mut self, result: ClientResult<TransactionsLoad>) {
        match result {
            Ok(load) => {
                debug!("Loaded {} transactions", load.entries.len());
                self.transactions = load.entries;
                if let Some(e) = load.enrichment_error {
                    self.fail(e);
                }
            }
            Err(e) => self.fail(e),
        }
    }

    /// Settle a load; when it was the last one, reveal the requested section
    /// or fall back to the info section.
    async fn finish(&mut self, ticket: LoadTicket) {
        if !self.tracker.settle(ticket) {
            return;
        }
        match self.requested_section {
            Some(section) => {
                self.revealed_section = Some(section);
                if !self.scroll_delay.is_zero() {
                    tokio::time::sleep(self.scroll_delay).await;
                }
                debug!("Scrolling to {}", section);
                self.host.scroll_into_view(section);
            }
            None => self.revealed_section = Some(Section::Info),
        }
    }

    fn fail(&mut self, error: ClientError) {
        warn!("Listing detail error: {}", error);
        self.error = Some(error.to_string());
    }

    fn token(&self) -> ClientResult<String> {
        self.session.login_token().ok_or(ClientError::Unauthorized)
    }

    fn loaded_listing(&self) -> ClientResult<&ListingView> {
        self.listing
            .as_ref()
            .ok_or_else(|| ClientError::Validation("Listing is not loaded".to_string()))
    }

    /// Whether `date` is taken by an existing booking. The month's bookings
    /// are fetched the first time a date in it is asked about.
    pub async fn is_date_occupied(&mut self, date: NaiveDate) -> bool {
        let listing_id = match self.loaded_listing() {
            Ok(view) => view.listing.listing_id,
            Err(_) => return false,
        };
        let api = Arc::clone(&self.api);
        match self
            .calendar
            .ensure_month(api.as_ref(), listing_id, month_key(date))
            .await
        {
            Ok(()) => self.calendar.is_occupied(date),
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Calendar click
    pub fn select_date(&mut self, date: NaiveDate) {
        self.calendar.select(date);
    }

    pub fn selection(&self) -> Option<DateRange> {
        self.calendar.selection()
    }

    /// Booking slot for a bookable listing, computed from the selection and
    /// the form.
    pub fn booking_request(&self, form: &TransactionForm) -> ClientResult<BookingRequest> {
        let view = self.loaded_listing()?;
        match view.listing.time_unit {
            Some(TimeUnit::Day) => {
                let range = self
                    .calendar
                    .selection()
                    .ok_or_else(|| ClientError::Validation("Select a start date".to_string()))?;
                BookingRequest::daily(range)
            }
            Some(TimeUnit::Hour) => {
                let date = self
                    .calendar
                    .selection()
                    .map(|range| range.start)
                    .or(form.date)
                    .ok_or_else(|| ClientError::Validation("Select a date".to_string()))?;
                let time = form
                    .time
                    .ok_or_else(|| ClientError::Validation("Select a start time".to_string()))?;
                let hours = form.number_of_assets.unwrap_or(0);
                BookingRequest::hourly(date, time, hours)
            }
            None => Err(ClientError::Validation(
                "Listing has no booking unit".to_string(),
            )),
        }
    }

    /// Buy the listing with the submitted form.
    ///
    /// Returns the new transaction on success, after which the host has been
    /// sent to the transactions page.
    pub async fn create_transaction(&mut self, form: TransactionForm) -> Option<TransactionId> {
        match self.try_create_transaction(form).await {
            Ok(id) => {
                self.host.navigate(Route::Transactions);
                Some(id)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    async fn try_create_transaction(&mut self, form: TransactionForm) -> ClientResult<TransactionId> {
        let listing = self.loaded_listing()?.listing.clone();
        let token = self.token()?;

        let booking = if listing.is_bookable() {
            Some(self.booking_request(&form)?)
        } else {
            None
        };

        let mut payload = NewTransaction::from_form(listing.listing_id, form);
        if let Some(request) = &booking {
            payload.number_of_assets = Some(request.quantity);
        }

        let id = self.api.create_transaction(&token, &payload).await?;
        info!("Created transaction {} for listing {}", id, listing.listing_id);

        if listing.is_single_sale() {
            match self.api.mark_listing_sold(listing.listing_id, &token).await {
                Ok(()) => self.set_listing_status(ListingStatus::Sold),
                Err(e) => self.fail(e),
            }
        }

        if let Some(request) = booking {
            let new_booking = request.for_transaction(id);
            if let Err(e) = self.api.create_booking(&token, &new_booking).await {
                warn!("Booking for transaction {} failed, cancelling it", id);
                let mut reason = e.to_string();
                if let Err(cancel) = self.api.cancel_transaction(id, &token).await {
                    warn!("Could not cancel transaction {}: {}", id, cancel);
                    reason = format!(
                        "{}; cancelling transaction {} also failed: {}",
                        reason, id, cancel
                    );
                }
                return Err(ClientError::Booking(reason));
            }
            info!(
                "Booked {} to {} for transaction {}",
                new_booking.start_date, new_booking.end_date, id
            );
            self.calendar
                .invalidate_range(new_booking.start_date, new_booking.end_date);
            self.calendar.clear_selection();
        }

        Ok(id)
    }

    pub async fn cancel_transaction(&mut self, id: TransactionId) {
        let result = match self.token() {
            Ok(token) => self.api.cancel_transaction(id, &token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!("Cancelled transaction {}", id);
                self.load_transactions().await;
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn confirm_payment(&mut self, id: TransactionId) {
        let result = match self.token() {
            Ok(token) => self.api.confirm_payment(id, &token).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!("Confirmed payment of transaction {}", id);
                self.load_transactions().await;
            }
            Err(e) => self.fail(e),
        }
    }

    /// Withdraw the listing from the market
    pub async fn cancel_listing(&mut self) {
        let result = match (self.loaded_listing(), self.token()) {
            (Ok(view), Ok(token)) => {
                let id = view.listing.listing_id;
                self.api.cancel_listing(id, &token).await.map(|()| id)
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        match result {
            Ok(id) => {
                info!("Cancelled listing {}", id);
                self.set_listing_status(ListingStatus::Cancelled);
                self.load_transactions().await;
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn contact_owner(&self) {
        if let Some(view) = &self.listing {
            self.host.navigate(Route::Messages {
                user_id: view.listing.user_id,
            });
        }
    }

    fn set_listing_status(&mut self, status: ListingStatus) {
        if let Some(view) = &mut self.listing {
            view.listing.status = status;
        }
    }
}

async fn fetch_transactions(
    api: &dyn MarketApi,
    listing_id: ListingId,
    token: Option<String>,
    bookable: bool,
) -> ClientResult<TransactionsLoad> {
    let token = token.ok_or(ClientError::Unauthorized)?;
    let transactions = api.get_listing_transactions(listing_id, &token).await?;

    let mut entries = Vec::with_capacity(transactions.len());
    let mut enrichment_error = None;
    for transaction in transactions {
        let mut entry = TransactionEntry::new(transaction);
        let tx = &entry.transaction;
        let (reviews, bookings) = tokio::join!(
            api.get_user_reviews(tx.customer_id),
            async {
                if bookable {
                    Some(api.get_transaction_bookings(tx.transaction_id, &token).await)
                } else {
                    None
                }
            },
        );
        match reviews {
            Ok(reviews) => entry.customer_reviews = Some(reviews),
            Err(e) => enrichment_error = Some(e),
        }
        match bookings {
            Some(Ok(bookings)) => entry.bookings = bookings,
            Some(Err(e)) => enrichment_error = Some(e),
            None => {}
        }
        entries.push(entry);
    }

    Ok(TransactionsLoad {
        entries,
        enrichment_error,
    })
}
