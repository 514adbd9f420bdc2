pub mod error;
pub mod http;
pub mod traits;
pub(crate) mod types;

pub use error::{ClientError, ClientResult};
pub use http::HttpMarketApi;
pub use traits::MarketApi;
