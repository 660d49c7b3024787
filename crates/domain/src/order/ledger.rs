//! Line-item ledger arithmetic.

use serde::{Deserialize, Serialize};

use crate::money::{Money, Percentage};

use super::{ItemType, OrderError, ServiceItem};

/// Largest discount an operator may grant, in percent.
pub const MAX_DISCOUNT_PERCENT: f64 = 10.0;

/// Ceiling on labor plus parts for a single order (R$ 1 bilhão).
pub const MAX_ORDER_SUBTOTAL: Money = Money::from_cents(100_000_000_000);

/// The three derived cost fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub labor_cost: Money,
    pub parts_cost: Money,
    pub total_cost: Money,
}

impl Totals {
    /// Labor plus parts, before discount.
    pub fn subtotal(&self) -> Money {
        self.labor_cost + self.parts_cost
    }

    /// Amount taken off by the discount.
    pub fn discount_amount(&self) -> Money {
        self.subtotal() - self.total_cost
    }
}

/// Computes the order totals from its items and discount.
///
/// This is the only place the cost fields are derived.
pub fn recompute_totals(items: &[ServiceItem], discount: Percentage) -> Totals {
    let sum_of = |kind: ItemType| -> Money {
        items
            .iter()
            .filter(|item| item.item_type == kind)
            .map(|item| item.total_price)
            .sum()
    };

    let labor_cost = sum_of(ItemType::Labor);
    let parts_cost = sum_of(ItemType::Part);

    Totals {
        labor_cost,
        parts_cost,
        total_cost: (labor_cost + parts_cost).discounted(discount),
    }
}

/// A discount request after clamping to `[0, MAX_DISCOUNT_PERCENT]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedDiscount {
    pub requested: f64,
    pub applied: Percentage,
}

impl ClampedDiscount {
    /// Returns true if the requested value was out of range.
    pub fn was_clamped(&self) -> bool {
        self.requested < 0.0 || self.requested > MAX_DISCOUNT_PERCENT
    }
}

/// Returns the subtotal after adding `line`, if it stays under the ceiling.
pub fn checked_subtotal(current: Money, unit_price: Money, quantity: u32) -> Result<Money, OrderError> {
    unit_price
        .checked_multiply(quantity)
        .and_then(|line| current.checked_add(line))
        .filter(|subtotal| *subtotal <= MAX_ORDER_SUBTOTAL)
        .ok_or(OrderError::AmountTooLarge {
            limit: MAX_ORDER_SUBTOTAL,
        })
}

/// Clamps a requested discount into the allowed range.
///
/// Out-of-range values are not an error; the caller reports the clamp as a
/// warning. Non-finite input is rejected.
pub fn clamp_discount(requested: f64) -> Result<ClampedDiscount, OrderError> {
    if !requested.is_finite() {
        return Err(OrderError::InvalidDiscount { requested });
    }

    let clamped = requested.clamp(0.0, MAX_DISCOUNT_PERCENT);
    let applied =
        Percentage::from_percent(clamped).ok_or(OrderError::InvalidDiscount { requested })?;

    Ok(ClampedDiscount { requested, applied })
}
