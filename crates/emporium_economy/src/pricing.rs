//! # Price Model
//!
//! Currencies, per-currency price requirements, and their aggregation into a
//! single total per currency.
//!
//! Both the transaction engine and the affordability planner price offers
//! through [`aggregate`], so their arithmetic never diverges.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::registry::ItemHandle;

/// Identity of a currency, e.g. `minecraft:emerald`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Creates a currency id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CurrencyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurrencyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A configured currency: its identity plus the item that represents it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    /// Currency identity. Two currencies with the same id are interchangeable.
    pub id: CurrencyId,
    /// Physical item deposited into and dropped from shops.
    pub item: ItemHandle,
}

/// One `(currency, unit price)` pair of an offer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriceRequirement {
    /// Currency charged.
    pub currency: CurrencyId,
    /// Price per purchase unit. Always positive once parsed.
    pub unit_price: u32,
}

impl PriceRequirement {
    /// Creates a price requirement.
    #[must_use]
    pub fn new(currency: impl Into<CurrencyId>, unit_price: u32) -> Self {
        Self {
            currency: currency.into(),
            unit_price,
        }
    }
}

/// Total cost per currency.
///
/// Entries keep the order in which each currency first appeared in the
/// requirement list; ids are unique. Equality ignores that order.
#[derive(Clone, Debug, Default, Eq)]
pub struct AggregatedPrice {
    totals: Vec<(CurrencyId, u64)>,
}

impl AggregatedPrice {
    /// Cost of `currency`, or 0 if it is not part of this price.
    #[must_use]
    pub fn get(&self, currency: &str) -> u64 {
        self.totals
            .iter()
            .find(|(id, _)| id.as_str() == currency)
            .map_or(0, |(_, amount)| *amount)
    }

    /// Iterates `(currency, amount)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyId, u64)> {
        self.totals.iter().map(|(id, amount)| (id, *amount))
    }

    /// Number of distinct currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns true if nothing is charged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Multiplies every entry by `quantity`.
    ///
    /// Returns `None` if any product overflows or is not positive, which
    /// callers treat as an infeasible purchase.
    #[must_use]
    pub fn scaled(&self, quantity: u32) -> Option<Self> {
        let mut totals = Vec::with_capacity(self.totals.len());
        for (id, amount) in &self.totals {
            let total = amount.checked_mul(u64::from(quantity))?;
            if total == 0 {
                return None;
            }
            totals.push((id.clone(), total));
        }
        Some(Self { totals })
    }

    /// Adds every entry into `reserved`.
    pub fn add_to(&self, reserved: &mut HashMap<CurrencyId, u64>) {
        for (id, amount) in &self.totals {
            let slot = reserved.entry(id.clone()).or_insert(0);
            *slot = slot.saturating_add(*amount);
        }
    }

    fn add(&mut self, currency: &CurrencyId, amount: u64) {
        if let Some((_, total)) = self.totals.iter_mut().find(|(id, _)| id == currency) {
            *total = total.saturating_add(amount);
        } else {
            self.totals.push((currency.clone(), amount));
        }
    }
}

impl PartialEq for AggregatedPrice {
    fn eq(&self, other: &Self) -> bool {
        self.totals.len() == other.totals.len()
            && self
                .totals
                .iter()
                .all(|(id, amount)| other.get(id.as_str()) == *amount)
    }
}

impl fmt::Display for AggregatedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, amount)) in self.totals.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{amount} {id}")?;
        }
        Ok(())
    }
}

/// Sums requirements that share a currency.
///
/// Duplicate currencies are additive. Non-positive prices are skipped; the
/// parser never produces them, but decoded or hand-built offers might.
#[must_use]
pub fn aggregate(prices: &[PriceRequirement]) -> AggregatedPrice {
    let mut aggregated = AggregatedPrice::default();
    for price in prices {
        if price.unit_price == 0 {
            continue;
        }
        aggregated.add(&price.currency, u64::from(price.unit_price));
    }
    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aggregate_sums_duplicates() {
        let prices = vec![
            PriceRequirement::new("gold", 3),
            PriceRequirement::new("gem", 1),
            PriceRequirement::new("gold", 2),
        ];
        let aggregated = aggregate(&prices);
        assert_eq!(aggregated.len(), 2);
        assert_eq!(aggregated.get("gold"), 5);
        assert_eq!(aggregated.get("gem"), 1);
        assert_eq!(aggregated.get("iron"), 0);
    }

    #[test]
    fn test_aggregate_skips_zero_price() {
        let prices = vec![PriceRequirement::new("gold", 0)];
        assert!(aggregate(&prices).is_empty());
    }

    #[test]
    fn test_first_seen_order() {
        let prices = vec![
            PriceRequirement::new("gem", 1),
            PriceRequirement::new("gold", 3),
            PriceRequirement::new("gem", 1),
        ];
        let aggregated = aggregate(&prices);
        let ids: Vec<&str> = aggregated.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["gem", "gold"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = aggregate(&[PriceRequirement::new("gold", 3), PriceRequirement::new("gem", 1)]);
        let b = aggregate(&[PriceRequirement::new("gem", 1), PriceRequirement::new("gold", 3)]);
        assert_eq!(a, b);
        assert_ne!(a, aggregate(&[PriceRequirement::new("gold", 3)]));
        assert_ne!(a, aggregate(&[PriceRequirement::new("gold", 3), PriceRequirement::new("gem", 2)]));
    }

    #[test]
    fn test_scaled() {
        let aggregated = aggregate(&[PriceRequirement::new("gold", 3)]);
        assert_eq!(aggregated.scaled(4).unwrap().get("gold"), 12);
        assert!(aggregated.scaled(0).is_none());
    }

    #[test]
    fn test_scaled_overflow_is_none() {
        let mut aggregated = AggregatedPrice::default();
        aggregated.add(&CurrencyId::from("gold"), u64::MAX / 2);
        assert!(aggregated.scaled(3).is_none());
    }

    #[test]
    fn test_display() {
        let aggregated = aggregate(&[
            PriceRequirement::new("gold", 3),
            PriceRequirement::new("gem", 1),
        ]);
        assert_eq!(aggregated.to_string(), "3 gold, 1 gem");
    }

    #[test]
    fn test_add_to_reserved() {
        let mut reserved = HashMap::new();
        let aggregated = aggregate(&[PriceRequirement::new("gold", 3)]);
        aggregated.add_to(&mut reserved);
        aggregated.add_to(&mut reserved);
        assert_eq!(reserved.get("gold"), Some(&6));
    }

    fn arb_prices() -> impl Strategy<Value = Vec<PriceRequirement>> {
        prop::collection::vec(
            (prop::sample::select(vec!["gold", "gem", "iron"]), 1u32..1_000),
            0..12,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(id, price)| PriceRequirement::new(id, price))
                .collect()
        })
    }

    proptest! {
        /// Property: aggregating a list with duplicates equals aggregating the
        /// same list with its duplicates summed up front.
        #[test]
        fn aggregation_is_additive(prices in arb_prices()) {
            let mut presummed: Vec<PriceRequirement> = Vec::new();
            for price in &prices {
                if let Some(existing) = presummed.iter_mut().find(|p| p.currency == price.currency) {
                    existing.unit_price += price.unit_price;
                } else {
                    presummed.push(price.clone());
                }
            }
            prop_assert_eq!(aggregate(&prices), aggregate(&presummed));
        }
    }
}
