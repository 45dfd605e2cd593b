//! # Affordability Planner
//!
//! Client-side preview of how many units of an offer the player could still
//! buy if every *other* tentative selection were honored first.
//!
//! ## Algorithm
//!
//! ```text
//! reserved = {}
//! for j in offers (catalog order), j != target, q[j] > 0:
//!     reserved += price[j] * min(q[j], max_affordable(j, reserved))
//! result = max_affordable(target, reserved)
//! ```
//!
//! The walk is greedy and order-dependent. It is a preview, not an optimal
//! allocation: two selections that are not jointly affordable are resolved in
//! favor of the earlier offer.
//!
//! Nothing here mutates a ledger or caches across calls; recompute after any
//! balance or quantity change.

use std::collections::HashMap;

use crate::ledger::Ledger;
use crate::pricing::{AggregatedPrice, Currency, CurrencyId};

/// Read-only access to balances.
pub trait BalanceView {
    /// Balance of `currency`; 0 if absent.
    fn balance(&self, currency: &str) -> u64;
}

impl BalanceView for Ledger {
    fn balance(&self, currency: &str) -> u64 {
        Ledger::balance(self, currency)
    }
}

impl BalanceView for HashMap<CurrencyId, u64> {
    fn balance(&self, currency: &str) -> u64 {
        self.get(currency).copied().unwrap_or(0)
    }
}

/// A client-side copy of balances, as last received from the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    balances: HashMap<CurrencyId, u64>,
}

impl BalanceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips `currencies` with `counts`. Extra entries on either side are
    /// ignored.
    #[must_use]
    pub fn from_counts(currencies: &[CurrencyId], counts: &[u64]) -> Self {
        let balances = currencies
            .iter()
            .zip(counts)
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        Self { balances }
    }

    /// Builds a snapshot from configured currencies and aligned counts.
    #[must_use]
    pub fn for_currencies(currencies: &[Currency], counts: &[u64]) -> Self {
        let ids: Vec<CurrencyId> = currencies.iter().map(|c| c.id.clone()).collect();
        Self::from_counts(&ids, counts)
    }

    /// Sets one balance.
    pub fn set(&mut self, currency: CurrencyId, count: u64) {
        self.balances.insert(currency, count);
    }
}

impl BalanceView for BalanceSnapshot {
    fn balance(&self, currency: &str) -> u64 {
        self.balances.balance(currency)
    }
}

/// Currency already spoken for by other selections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservation {
    reserved: HashMap<CurrencyId, u64>,
}

impl Reservation {
    /// Creates an empty reservation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount of `currency` reserved so far.
    #[must_use]
    pub fn reserved(&self, currency: &str) -> u64 {
        self.reserved.balance(currency)
    }

    /// Units of `price` affordable from what is left after this reservation.
    ///
    /// An empty price affords 0, never an unbounded amount.
    #[must_use]
    pub fn max_affordable(&self, price: &AggregatedPrice, balances: &dyn BalanceView) -> u32 {
        if price.is_empty() {
            return 0;
        }
        let mut max = u64::MAX;
        for (currency, unit_cost) in price.iter() {
            if unit_cost == 0 {
                continue;
            }
            let available = balances
                .balance(currency.as_str())
                .saturating_sub(self.reserved(currency.as_str()));
            max = max.min(available / unit_cost);
        }
        if max == u64::MAX {
            return 0;
        }
        u32::try_from(max).unwrap_or(u32::MAX)
    }

    /// Clamps `quantity` to what is affordable, reserves it, and returns the
    /// clamped quantity.
    pub fn reserve(&mut self, price: &AggregatedPrice, quantity: u32, balances: &dyn BalanceView) -> u32 {
        let clamped = quantity.min(self.max_affordable(price, balances));
        if clamped > 0 {
            if let Some(total) = price.scaled(clamped) {
                total.add_to(&mut self.reserved);
            }
        }
        clamped
    }
}

/// Maximum units of `prices[target]` affordable once every other positive
/// entry of `quantities` has been reserved in catalog order.
///
/// `quantities` is index-aligned with `prices`; missing entries count as 0.
/// Returns 0 for an out-of-range target.
#[must_use]
pub fn affordable_excluding(
    prices: &[AggregatedPrice],
    quantities: &[u32],
    balances: &dyn BalanceView,
    target: usize,
) -> u32 {
    let Some(target_price) = prices.get(target) else {
        return 0;
    };
    let mut reservation = Reservation::new();
    for (j, price) in prices.iter().enumerate() {
        if j == target {
            continue;
        }
        let quantity = quantities.get(j).copied().unwrap_or(0);
        if quantity == 0 {
            continue;
        }
        reservation.reserve(price, quantity, balances);
    }
    reservation.max_affordable(target_price, balances)
}

/// [`affordable_excluding`] for every offer.
#[must_use]
pub fn affordable_all(prices: &[AggregatedPrice], quantities: &[u32], balances: &dyn BalanceView) -> Vec<u32> {
    (0..prices.len())
        .map(|i| affordable_excluding(prices, quantities, balances, i))
        .collect()
}
