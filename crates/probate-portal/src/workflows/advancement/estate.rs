use serde::Serialize;

use super::domain::EstateItem;

/// Share of the lendable Irish estate that may be advanced.
pub const ADVANCE_RATIO: f64 = 0.5;

/// Asset and liability totals for an estate declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EstateTotals {
    pub lendable_assets: f64,
    pub other_assets: f64,
    pub liabilities: f64,
}

impl EstateTotals {
    pub fn from_items(items: &[EstateItem]) -> Self {
        items.iter().fold(Self::default(), |mut totals, item| {
            match (item.is_asset, item.lendable) {
                (true, true) => totals.lendable_assets += item.value,
                (true, false) => totals.other_assets += item.value,
                (false, _) => totals.liabilities += item.value,
            }
            totals
        })
    }

    /// Lendable assets less every liability; may be negative.
    pub fn lendable_irish_estate(&self) -> f64 {
        self.lendable_assets - self.liabilities
    }

    pub fn maximum_advance(&self) -> f64 {
        (self.lendable_irish_estate() * ADVANCE_RATIO).max(0.0)
    }
}

/// Advisory comparison of the requested amount against the estate cap.
///
/// This mirrors what the portal shows solicitors while they fill in the estate;
/// the authoritative underwriting figure is calculated by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdvanceValidation {
    pub lendable_irish_estate: f64,
    pub maximum_advance: f64,
    pub requested_amount: f64,
    pub is_exceeded: bool,
    pub excess_amount: f64,
    pub utilization_percent: f64,
}

pub fn lendable_irish_estate(items: &[EstateItem]) -> f64 {
    EstateTotals::from_items(items).lendable_irish_estate()
}

pub fn maximum_advance(items: &[EstateItem]) -> f64 {
    EstateTotals::from_items(items).maximum_advance()
}

pub fn validate_advance(items: &[EstateItem], requested_amount: f64) -> AdvanceValidation {
    let totals = EstateTotals::from_items(items);
    let maximum_advance = totals.maximum_advance();
    let is_exceeded = requested_amount > maximum_advance;
    let excess_amount = if is_exceeded {
        requested_amount - maximum_advance
    } else {
        0.0
    };
    let utilization_percent = if maximum_advance > 0.0 {
        requested_amount / maximum_advance * 100.0
    } else {
        0.0
    };

    AdvanceValidation {
        lendable_irish_estate: totals.lendable_irish_estate(),
        maximum_advance,
        requested_amount,
        is_exceeded,
        excess_amount,
        utilization_percent,
    }
}
