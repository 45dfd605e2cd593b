//! # Client Shop View
//!
//! The client's copy of an open shop: the snapshot it received, the last
//! balances the server reported, and the player's tentative selection.
//!
//! Nothing here is authoritative. Affordability is recomputed from the local
//! balance copy on every change; the server re-validates every click. Only
//! offers of the selected category reserve currency.

use emporium_economy::{AggregatedPrice, BalanceSnapshot, BalanceView, SelectionState};

use crate::packets::{BalanceUpdate, ShopPacket};
use crate::snapshot::{CatalogSnapshot, SnapshotOffer};

/// Client-side state of one open shop menu.
#[derive(Clone, Debug)]
pub struct ClientShopView {
    snapshot: CatalogSnapshot,
    prices: Vec<AggregatedPrice>,
    balances: BalanceSnapshot,
    selection: SelectionState,
    category: String,
}

impl ClientShopView {
    /// Opens a view on a received snapshot. Balances start at zero until the
    /// first update, so nothing is selectable before then.
    #[must_use]
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let prices = snapshot.prices();
        let selection = SelectionState::new(snapshot.offers.len());
        let category = snapshot.categories.first().cloned().unwrap_or_default();
        let mut view = Self {
            snapshot,
            prices,
            balances: BalanceSnapshot::new(),
            selection,
            category,
        };
        view.show_category();
        view
    }

    /// The snapshot in use.
    #[must_use]
    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Offer at `index`.
    #[must_use]
    pub fn offer(&self, index: usize) -> Option<&SnapshotOffer> {
        self.snapshot.offers.get(index)
    }

    /// Last reported balance of `currency`.
    #[must_use]
    pub fn balance(&self, currency: &str) -> u64 {
        self.balances.balance(currency)
    }

    /// Applies a server packet. Returns false for packets a client does not
    /// expect.
    pub fn apply(&mut self, packet: ShopPacket) -> bool {
        match packet {
            ShopPacket::CatalogSnapshot(snapshot) => {
                self.replace_snapshot(snapshot);
                true
            }
            ShopPacket::BalanceUpdate(update) => {
                self.apply_balances(&update);
                true
            }
            ShopPacket::PurchaseClick(_) => false,
        }
    }

    /// Replaces the catalog. Selections reset to 1; balances are kept.
    pub fn replace_snapshot(&mut self, snapshot: CatalogSnapshot) {
        self.prices = snapshot.prices();
        self.selection.reset(snapshot.offers.len());
        if !snapshot.categories.contains(&self.category) {
            self.category = snapshot.categories.first().cloned().unwrap_or_default();
        }
        self.snapshot = snapshot;
        self.show_category();
    }

    /// Stores new balances and re-clamps every selection.
    pub fn apply_balances(&mut self, update: &BalanceUpdate) {
        self.balances = BalanceSnapshot::from_counts(&self.snapshot.currencies, &update.counts);
        self.refresh();
    }

    /// Re-clamps every selection against the current balances.
    pub fn refresh(&mut self) {
        self.selection.refresh(&self.prices, &self.balances);
    }

    /// Tentative quantity of offer `index`.
    #[must_use]
    pub fn quantity(&self, index: usize) -> u32 {
        self.selection.quantity(index)
    }

    /// Most units of offer `index` affordable alongside the selections of the
    /// other offers in the selected category.
    #[must_use]
    pub fn affordable(&self, index: usize) -> u32 {
        self.selection.max_affordable(index, &self.prices, &self.balances)
    }

    /// Changes the tentative quantity of offer `index` by `delta`.
    pub fn adjust(&mut self, index: usize, delta: i64) -> u32 {
        self.selection.adjust(index, delta, &self.prices, &self.balances)
    }

    /// Selected category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Switches category. Unknown labels are ignored.
    pub fn select_category(&mut self, category: &str) -> bool {
        if !self.snapshot.categories.iter().any(|c| c == category) {
            return false;
        }
        self.category = category.to_string();
        self.show_category();
        true
    }

    fn show_category(&mut self) {
        self.selection
            .set_visible(self.snapshot.offers_in_category(&self.category).map(|(index, _)| index));
        self.refresh();
    }

    /// Offers of the selected category, with their indices.
    pub fn visible_offers(&self) -> impl Iterator<Item = (usize, &SnapshotOffer)> + '_ {
        self.snapshot.offers_in_category(&self.category)
    }

    /// Offers of `category`, with their indices.
    pub fn offers_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (usize, &'a SnapshotOffer)> + 'a {
        self.snapshot.offers_in_category(category)
    }

    /// Builds the click packet for offer `index`, or `None` if nothing is
    /// selected. The selection is restored to 1 afterwards.
    pub fn purchase(&mut self, index: usize) -> Option<ShopPacket> {
        let click_id = self.selection.click_id(index)?;
        self.selection.after_purchase(index, &self.prices, &self.balances);
        Some(ShopPacket::PurchaseClick(click_id))
    }
}
