pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use config::*;
pub use domain::*;
pub use error::{Error, Result};
