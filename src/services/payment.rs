//! Payment summaries and ticket quotes.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    DiscountKind, DiscountVerification, PaymentSummary, Quote, QuoteDisplay, QuoteRequest,
};
use crate::services::currency::CurrencyDirectory;
use crate::services::discount::DiscountResolver;
use crate::services::pricing::{convert_between, format_price};
use crate::store::TicketTierStore;
use crate::utils::{AppError, AppResult};

/// `subtotal - discount + fees`, with the discount clamped to `[0, subtotal]`
/// so the total never drops below the fees. Overflowing amounts saturate at
/// `Decimal::MAX` instead of panicking.
pub fn summarize(
    unit_price: Decimal,
    quantity: u32,
    discount: DiscountKind,
    fees: Decimal,
) -> PaymentSummary {
    let subtotal = unit_price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or_else(|| {
            warn!(%unit_price, quantity, "Subtotal overflowed, saturating");
            saturate(unit_price)
        });
    let requested = match discount {
        DiscountKind::Percent(percent) => percent
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| subtotal.checked_mul(fraction))
            .unwrap_or_else(|| {
                warn!(%subtotal, %percent, "Percent discount overflowed, clamping");
                if percent.is_sign_negative() {
                    Decimal::ZERO
                } else {
                    subtotal
                }
            }),
        DiscountKind::FixedAmount(amount) => amount,
        DiscountKind::None => Decimal::ZERO,
    };
    let discount_value = requested.max(Decimal::ZERO).min(subtotal.max(Decimal::ZERO));
    if discount_value != requested {
        debug!(%requested, %discount_value, "Discount clamped to subtotal");
    }

    let discounted = subtotal - discount_value;
    let total = discounted.checked_add(fees).unwrap_or_else(|| {
        warn!(%discounted, %fees, "Total overflowed, saturating");
        saturate(fees)
    });

    PaymentSummary {
        subtotal,
        discount_value,
        fees,
        total,
    }
}

fn saturate(sign_of: Decimal) -> Decimal {
    if sign_of.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Builds ticket quotes in the customer's display currency.
#[derive(Clone)]
pub struct QuoteService {
    tiers: Arc<dyn TicketTierStore>,
    currencies: CurrencyDirectory,
    discounts: DiscountResolver,
    platform_fee_percent: Decimal,
}

/// A quote plus any non-fatal problem met while building it.
pub struct QuoteOutcome {
    pub quote: Quote,
    pub warning: Option<String>,
}

impl QuoteService {
    pub fn new(
        tiers: Arc<dyn TicketTierStore>,
        currencies: CurrencyDirectory,
        discounts: DiscountResolver,
        platform_fee_percent: Decimal,
    ) -> Self {
        Self {
            tiers,
            currencies,
            discounts,
            platform_fee_percent,
        }
    }

    pub async fn quote(&self, event_id: Uuid, request: QuoteRequest) -> AppResult<QuoteOutcome> {
        let quantity = u32::try_from(request.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| AppError::ValidationError("quantity must be at least 1".into()))?;

        let tier = self
            .tiers
            .find_tier(event_id, request.ticket_tier_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Ticket tier '{}' was not found for this event",
                    request.ticket_tier_id
                ))
            })?;

        if request.quantity > tier.available_quantity {
            return Err(AppError::ValidationError(format!(
                "Only {} ticket(s) remain in '{}'",
                tier.available_quantity.max(0),
                tier.name
            )));
        }

        let listing = self.currencies.list_active_currencies().await;
        let mut warnings: Vec<String> = listing.warning.iter().cloned().collect();

        let base = listing.find(self.currencies.base_currency());
        let requested_code = request
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let display = match requested_code {
            Some(code) => {
                let found = listing.find(code);
                if found.is_none() && listing.warning.is_none() {
                    return Err(AppError::ValidationError(format!(
                        "Currency '{code}' is not available"
                    )));
                }
                found
            }
            None => base,
        };
        // Without a base rate everything stays in the base currency.
        let display = if base.is_some() {
            display
        } else {
            if listing.warning.is_none() {
                warn!(
                    base = self.currencies.base_currency(),
                    "Base currency missing from active currencies"
                );
                warnings.push(format!(
                    "Exchange rates for {} are unavailable; prices are shown in {}",
                    self.currencies.base_currency(),
                    self.currencies.base_currency()
                ));
            }
            None
        };
        let currency_code = display
            .map(|c| c.code.clone())
            .unwrap_or_else(|| self.currencies.base_currency().to_string());
        let symbol = display.map(|c| c.symbol.as_str());

        let unit_price = convert_between(tier.price, base, display);

        let verification = match request.discount_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                Some(match self.discounts.verify(code, event_id).await {
                    Ok(verification) => verification,
                    Err(e) => {
                        warn!(error = %e, %event_id, "Discount verification failed");
                        warnings.push("Discount code could not be checked right now".into());
                        DiscountVerification::invalid()
                    }
                })
            }
            _ => None,
        };

        let discount = match verification.as_ref().map(|v| v.discount) {
            Some(DiscountKind::FixedAmount(amount)) => {
                DiscountKind::FixedAmount(convert_between(amount, base, display))
            }
            Some(kind) => kind,
            None => DiscountKind::None,
        };

        let without_fees = summarize(unit_price, quantity, discount, Decimal::ZERO);
        let fees = self
            .platform_fee_percent
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| without_fees.total.checked_mul(fraction))
            .unwrap_or_else(|| {
                warn!(total = %without_fees.total, "Platform fee overflowed, saturating");
                Decimal::MAX
            })
            .max(Decimal::ZERO);
        let summary = summarize(unit_price, quantity, discount, fees);

        let quote = Quote {
            ticket_tier_id: tier.id,
            quantity: request.quantity,
            currency: currency_code,
            unit_price,
            summary,
            discount: verification,
            display: QuoteDisplay {
                unit_price: format_price(unit_price, symbol),
                subtotal: format_price(summary.subtotal, symbol),
                discount_value: format_price(summary.discount_value, symbol),
                fees: format_price(summary.fees, symbol),
                total: format_price(summary.total, symbol),
            },
        };

        Ok(QuoteOutcome {
            quote,
            warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
        })
    }
}
