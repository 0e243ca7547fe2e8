use serde::{Deserialize, Serialize};

use crate::money::{MonetaryAmount, ShareQuantity};

/// Where a holdings query looks: a single portfolio or the whole client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HoldingsScope {
    Portfolio(String),
    Client,
}

/// A position as of a date: held shares and their market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub shares: ShareQuantity,
    pub value: MonetaryAmount,
}
