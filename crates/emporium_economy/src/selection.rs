//! # Selection State
//!
//! The client's tentative quantity per offer, kept within what the
//! affordability planner says is still affordable.
//!
//! Quantities start at 1. After every clamp a quantity lies in
//! `[min(1, max), max]`, so it is 0 exactly when nothing is affordable.
//!
//! Only visible offers reserve currency. A hidden offer keeps its quantity
//! but counts as 0 for every other offer's limit until it is shown again.

use crate::affordability::{affordable_excluding, BalanceView};
use crate::command::PurchaseCommand;
use crate::pricing::AggregatedPrice;

/// Tentative quantities, index-aligned with the catalog's offers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
    quantities: Vec<u32>,
    visible: Vec<bool>,
}

impl SelectionState {
    /// Creates a selection of 1 unit for each of `offer_count` offers.
    #[must_use]
    pub fn new(offer_count: usize) -> Self {
        Self {
            quantities: vec![1; offer_count],
            visible: vec![true; offer_count],
        }
    }

    /// Number of offers tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Returns true if there are no offers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Tentative quantity of offer `index`; 0 if out of range.
    #[must_use]
    pub fn quantity(&self, index: usize) -> u32 {
        self.quantities.get(index).copied().unwrap_or(0)
    }

    /// All tentative quantities.
    #[must_use]
    pub fn quantities(&self) -> &[u32] {
        &self.quantities
    }

    /// Makes exactly the offers at `indices` visible.
    pub fn set_visible(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.visible.fill(false);
        for index in indices {
            if let Some(visible) = self.visible.get_mut(index) {
                *visible = true;
            }
        }
    }

    /// Returns true if offer `index` is visible.
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    /// Quantities as seen by the planner: hidden offers count as 0.
    #[must_use]
    pub fn reserving_quantities(&self) -> Vec<u32> {
        self.quantities
            .iter()
            .zip(&self.visible)
            .map(|(quantity, visible)| if *visible { *quantity } else { 0 })
            .collect()
    }

    /// Most units of offer `index` affordable alongside the other visible
    /// selections.
    #[must_use]
    pub fn max_affordable(&self, index: usize, prices: &[AggregatedPrice], balances: &dyn BalanceView) -> u32 {
        affordable_excluding(prices, &self.reserving_quantities(), balances, index)
    }

    /// Adds `delta` to offer `index` and clamps. Returns the new quantity.
    pub fn adjust(&mut self, index: usize, delta: i64, prices: &[AggregatedPrice], balances: &dyn BalanceView) -> u32 {
        if index >= self.quantities.len() {
            return 0;
        }
        let max = self.max_affordable(index, prices, balances);
        let min = max.min(1);
        let wanted = i64::from(self.quantities[index]).saturating_add(delta);
        let clamped = wanted.clamp(i64::from(min), i64::from(max));
        // clamped lies within [min, max], both u32
        let quantity = u32::try_from(clamped).unwrap_or(max);
        self.quantities[index] = quantity;
        quantity
    }

    /// Re-clamps every quantity in catalog order. Run after every balance
    /// update and visibility change.
    pub fn refresh(&mut self, prices: &[AggregatedPrice], balances: &dyn BalanceView) {
        for index in 0..self.quantities.len() {
            self.adjust(index, 0, prices, balances);
        }
    }

    /// Click id requesting the current quantity of offer `index`, or `None`
    /// if that quantity is 0.
    #[must_use]
    pub fn click_id(&self, index: usize) -> Option<u32> {
        PurchaseCommand::new(index, self.quantity(index)).encode(self.quantities.len())
    }

    /// Restores offer `index` after a purchase was sent: back to at least 1,
    /// then clamped against the current balances.
    pub fn after_purchase(&mut self, index: usize, prices: &[AggregatedPrice], balances: &dyn BalanceView) -> u32 {
        if index >= self.quantities.len() {
            return 0;
        }
        let max = self.max_affordable(index, prices, balances);
        self.quantities[index] = self.quantities[index].max(1).min(max);
        self.adjust(index, 0, prices, balances)
    }

    /// Resets to 1 unit each, all visible, for a new offer list.
    pub fn reset(&mut self, offer_count: usize) {
        self.quantities = vec![1; offer_count];
        self.visible = vec![true; offer_count];
    }
}
