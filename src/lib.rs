pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod probe;
pub mod util;

pub use config::{Config, Conversion};
pub use driver::{ConvertSummary, Driver};
pub use error::ConvertError;
