//! Module: types
//! Responsibility: strongly-typed scalar payloads carried by `Value`.
//! Does not own: coercion policy or binary layout.

mod record_id;
mod temporal;

pub use record_id::{RecordId, RecordIdParseError};
pub use rust_decimal::Decimal;
pub use temporal::{Date, DateTime, TemporalError};
