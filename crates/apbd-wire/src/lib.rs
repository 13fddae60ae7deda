//! APBD backend payload decoding
//!
//! Turns the JSON documents served by the budget backend (or exported from it)
//! into typed wire records. Conversion into the aggregation model happens in
//! `apbd-core`.

pub mod error;
pub mod payload;
pub mod types;

pub use error::{WireError, WireResult};
pub use payload::{parse_categories, parse_payload, parse_transactions, WirePayload};
pub use types::{decode_amount, WireCategory, WireTransaction, WireYear};
