//! Shared row/domain conversion helpers.

use std::str::FromStr;

use cajaflow_core::debts::Payment;
use cajaflow_core::errors::Result;
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Serializes an enum into its bare serde string for a TEXT column.
pub fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

/// Parses an enum back out of its bare serde string.
pub fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_str(&format!("\"{}\"", value))?)
}

/// Decodes a TEXT-encoded decimal amount.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| StorageError::Decode(format!("Invalid amount '{raw}': {e}")).into())
}

/// Decodes the JSON `pagos` column.
pub fn parse_payments(raw: &str) -> Result<Vec<Payment>> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Decode(format!("Invalid payment list: {e}")).into())
}
