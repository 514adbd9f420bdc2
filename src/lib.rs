//! Headless view-model of a marketplace listing detail screen.
//!
//! [`view::ListingDetail`] loads a listing with its categories, reviews and,
//! for the owner, its transactions from a [`api::MarketApi`] backend, and
//! carries out the purchase, booking and cancellation actions of the screen.

pub mod api;
pub mod config;
pub mod models;
pub mod view;

pub use api::{ClientError, ClientResult, HttpMarketApi, MarketApi};
pub use config::Config;
pub use view::{ListingDetail, RouteParams};
