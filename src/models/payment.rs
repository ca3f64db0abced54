use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::discount_code::DiscountVerification;

/// Derived price breakdown. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub subtotal: Decimal,
    pub discount_value: Decimal,
    pub fees: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub ticket_tier_id: Uuid,
    pub quantity: i32,
    /// Display currency; the base currency when omitted.
    pub currency: Option<String>,
    pub discount_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub ticket_tier_id: Uuid,
    pub quantity: i32,
    pub currency: String,
    pub unit_price: Decimal,
    pub summary: PaymentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountVerification>,
    pub display: QuoteDisplay,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteDisplay {
    pub unit_price: String,
    pub subtotal: String,
    pub discount_value: String,
    pub fees: String,
    pub total: String,
}
