pub mod calendar;
pub mod controller;
pub mod host;
pub mod tracker;

pub use calendar::{BookingCalendar, BookingRequest, DateRange, MonthKey};
pub use controller::{ListingDetail, RouteParams};
pub use host::{Route, Section, Session, StaticSession, ViewHost};
pub use tracker::{LoadTicket, LoadTracker};
