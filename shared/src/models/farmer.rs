//! Farmer models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A contract farmer as returned by the farmer-details query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: String,
    pub name: String,
    /// Running feed balance in bags, maintained by the server
    pub main_stock: Decimal,
    #[serde(default)]
    pub organization_id: Option<String>,
}
