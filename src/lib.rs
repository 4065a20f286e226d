pub mod app;
pub mod config;
pub mod constants;
pub mod currency;
pub mod db;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod providers;
pub mod tracker;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
