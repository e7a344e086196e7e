//! Shared domain types, query specification, configuration and errors for
//! the Barista recommendation service.

pub mod config;
pub mod error;
pub mod query;
pub mod types;

pub use config::BaristaConfig;
pub use error::{BaristaError, Result};
pub use query::{Clause, OrderBy, QuerySpec};
pub use types::*;
