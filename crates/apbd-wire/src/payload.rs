//! Document-level decoding: backend envelopes and exported bundles

use serde::Deserialize;

use crate::error::{WireError, WireResult};
use crate::types::{RawTransaction, WireCategory, WireTransaction};

/// Decoded payload holding whichever lists the document carried
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WirePayload {
    pub transactions: Option<Vec<WireTransaction>>,
    pub categories: Option<Vec<WireCategory>>,
}

impl WirePayload {
    /// Transactions, or an empty list when the document had none
    pub fn transactions_or_empty(&self) -> &[WireTransaction] {
        self.transactions.as_deref().unwrap_or(&[])
    }

    /// Categories, or an empty list when the document had none
    pub fn categories_or_empty(&self) -> &[WireCategory] {
        self.categories.as_deref().unwrap_or(&[])
    }
}

/// `{ success, data?, message?, error? }`
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<RawLists>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLists {
    #[serde(default)]
    transactions: Option<Vec<RawTransaction>>,
    #[serde(default)]
    categories: Option<Vec<WireCategory>>,
}

/// Decode a backend response or an exported `{ transactions, categories }` bundle.
pub fn parse_payload(content: &str) -> WireResult<WirePayload> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let is_envelope = value
        .as_object()
        .map(|object| object.contains_key("success"))
        .unwrap_or(false);

    let lists = if is_envelope {
        let envelope: Envelope = serde_json::from_value(value)?;
        if !envelope.success {
            let message = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(WireError::Unsuccessful { message });
        }
        envelope.data.unwrap_or_default()
    } else {
        serde_json::from_value::<RawLists>(value)?
    };

    let transactions = match lists.transactions {
        Some(raw) => Some(
            raw.into_iter()
                .map(RawTransaction::decode)
                .collect::<WireResult<Vec<_>>>()?,
        ),
        None => None,
    };

    log::debug!(
        target: "apbd::wire",
        "Decoded payload: {} transactions, {} categories",
        transactions.as_ref().map_or(0, Vec::len),
        lists.categories.as_ref().map_or(0, Vec::len)
    );

    Ok(WirePayload {
        transactions,
        categories: lists.categories,
    })
}

/// Decode a document that must carry a transaction list
pub fn parse_transactions(content: &str) -> WireResult<Vec<WireTransaction>> {
    parse_payload(content)?
        .transactions
        .ok_or(WireError::MissingData { field: "transactions" })
}

/// Decode a document that must carry a category list
pub fn parse_categories(content: &str) -> WireResult<Vec<WireCategory>> {
    parse_payload(content)?
        .categories
        .ok_or(WireError::MissingData { field: "categories" })
}
