pub mod traits;
pub mod yahoo;

pub use traits::{Listing, PriceSource, Quote};
pub use yahoo::YahooClient;
