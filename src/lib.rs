pub mod analyzers;
pub mod booking;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod table;

pub use error::{Error, Result};
