use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod review;
mod transaction;

pub use review::{Review, ReviewSummary};
pub use transaction::{
    Booking, NewBooking, NewTransaction, Transaction, TransactionEntry, TransactionForm,
    TransactionStatus,
};

pub type ListingId = i64;
pub type UserId = i64;
pub type TransactionId = i64;

/// Category taxonomy as served by the backend: group name -> tags
pub type Taxonomy = BTreeMap<String, Vec<String>>;

/// Lifecycle state of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Cancelled,
    Sold,
}

/// Whether the listing sells a physical good or a service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Good,
    Service,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    OneTime,
    Recurring,
}

/// How many units the seller offers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    One,
    Multiple,
}

/// Pricing unit of a bookable listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Hour,
}

/// Core listing record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "listingID")]
    pub listing_id: ListingId,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub status: ListingStatus,
    #[serde(default)]
    pub categories: Vec<String>,
    pub kind: ListingKind,
    pub frequency: Frequency,
    pub quantity: Quantity,
    #[serde(default)]
    pub time_unit: Option<TimeUnit>,
}

impl Listing {
    /// A one-off item that disappears from the market after a single sale
    pub fn is_single_sale(&self) -> bool {
        self.quantity == Quantity::One && self.frequency != Frequency::Recurring
    }

    /// Recurring services are sold through bookings on the calendar
    pub fn is_bookable(&self) -> bool {
        self.kind == ListingKind::Service && self.frequency == Frequency::Recurring
    }

    pub fn is_owned_by(&self, user: Option<UserId>) -> bool {
        user == Some(self.user_id)
    }

    /// Cross-reference the listing's tags with the taxonomy.
    ///
    /// Groups without any of the listing's tags are left out; tags keep the
    /// order the taxonomy lists them in.
    pub fn group_categories(&self, taxonomy: &Taxonomy) -> Vec<CategoryGroup> {
        taxonomy
            .iter()
            .filter_map(|(name, tags)| {
                let matching: Vec<String> = tags
                    .iter()
                    .filter(|tag| self.categories.contains(tag))
                    .cloned()
                    .collect();
                (!matching.is_empty()).then(|| CategoryGroup {
                    name: name.clone(),
                    tags: matching,
                })
            })
            .collect()
    }
}

/// Subset of a listing's tags that belong to one taxonomy group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: String,
    pub tags: Vec<String>,
}

/// A listing together with its derived category groups
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub listing: Listing,
    pub category_groups: Vec<CategoryGroup>,
}

impl ListingView {
    pub fn new(listing: Listing, taxonomy: &Taxonomy) -> Self {
        let category_groups = listing.group_categories(taxonomy);
        Self {
            listing,
            category_groups,
        }
    }
}
