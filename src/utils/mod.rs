//! Shared parsing helpers

pub mod datetime;
pub mod iso6709;

pub use datetime::{normalize_date, MetaDateTime};
pub use iso6709::Iso6709;
