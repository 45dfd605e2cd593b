//! # Shop
//!
//! One shop container in the world: a position and the ledger of currency
//! deposited into it. Everything a host does with a shop goes through here:
//! opening it, feeding currency in, handling purchase clicks, saving and
//! loading, and breaking it.
//!
//! The catalog is passed in on every call rather than stored, so a config
//! reload takes effect on the next interaction.

use crate::catalog::Catalog;
use crate::command::PurchaseCommand;
use crate::error::{ShopError, ShopResult};
use crate::ledger::{Ledger, SharedLedger};
use crate::pricing::AggregatedPrice;
use crate::registry::{ItemRegistry, ItemStack};
use crate::tag::CompoundTag;
use crate::transaction::{purchase_shared, Delivery, DropSink, Position, Receipt};

/// What the player is told after interacting with a shop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopMessage {
    /// The catalog is empty; the menu does not open.
    NoOffers,
    /// The menu opened.
    MenuOpened {
        /// Number of offers shown.
        offers: usize,
    },
    /// A purchase went through.
    Purchased {
        /// Item bought.
        item: String,
        /// Units bought.
        quantity: u32,
    },
    /// The ledger is short.
    InsufficientFunds {
        /// Item the player tried to buy.
        item: String,
        /// Per-unit price breakdown.
        cost: AggregatedPrice,
    },
    /// The click was malformed or stale. Nothing happened.
    Ignored,
}

/// A shop container.
#[derive(Debug)]
pub struct Shop {
    position: Position,
    ledger: SharedLedger,
}

impl Shop {
    /// Creates an empty shop at `position`.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self::with_ledger(position, Ledger::new())
    }

    /// Creates a shop holding `ledger`.
    #[must_use]
    pub fn with_ledger(position: Position, ledger: Ledger) -> Self {
        Self {
            position,
            ledger: SharedLedger::new(ledger),
        }
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The shop's ledger.
    #[must_use]
    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Opens the menu, unless there is nothing to sell.
    #[must_use]
    pub fn open(&self, catalog: &Catalog) -> ShopMessage {
        if catalog.offers().is_empty() {
            return ShopMessage::NoOffers;
        }
        ShopMessage::MenuOpened {
            offers: catalog.offers().len(),
        }
    }

    /// Returns true if `stack` may be inserted through currency slot `slot`.
    #[must_use]
    pub fn accepts(&self, catalog: &Catalog, slot: usize, stack: &ItemStack) -> bool {
        !stack.is_empty()
            && catalog
                .currency_for_slot(slot)
                .is_some_and(|currency| stack.is_same_item(&currency.item))
    }

    /// Deposits `stack` through slot `slot`. Returns what was not taken:
    /// nothing if accepted, the whole stack otherwise.
    pub fn insert(&self, catalog: &Catalog, slot: usize, stack: ItemStack) -> ItemStack {
        if !self.accepts(catalog, slot, &stack) {
            return stack;
        }
        let Some(currency) = catalog.currency_for_slot(slot) else {
            return stack;
        };
        self.ledger.deposit(&currency.id, u64::from(stack.count));
        ItemStack::new(stack.item, 0)
    }

    /// Balances in catalog currency order, as sent to the client.
    #[must_use]
    pub fn balances_for(&self, catalog: &Catalog) -> Vec<u64> {
        let ledger = self.ledger.snapshot();
        catalog
            .currencies()
            .iter()
            .map(|currency| ledger.balance(currency.id.as_str()))
            .collect()
    }

    /// Buys `quantity` units of the offer at `offer_index`.
    ///
    /// # Errors
    ///
    /// `ShopError::OfferNotFound` for a bad index, otherwise whatever
    /// [`purchase_shared`] returns. The ledger is unchanged on every error.
    pub fn purchase(
        &self,
        catalog: &Catalog,
        offer_index: usize,
        quantity: u32,
        delivery: Delivery<'_>,
    ) -> ShopResult<Receipt> {
        let offer = catalog
            .offer(offer_index)
            .ok_or(ShopError::OfferNotFound(offer_index))?;
        purchase_shared(offer, quantity, &self.ledger, delivery)
    }

    /// Handles a purchase click id from the menu.
    pub fn handle_click(&self, catalog: &Catalog, click_id: u32, delivery: Delivery<'_>) -> ShopMessage {
        let Some(command) = PurchaseCommand::decode(click_id, catalog.offers().len()) else {
            tracing::debug!(click_id, offers = catalog.offers().len(), "ignoring malformed click");
            return ShopMessage::Ignored;
        };
        let Some(offer) = catalog.offer(command.offer_index) else {
            return ShopMessage::Ignored;
        };

        match self.purchase(catalog, command.offer_index, command.quantity, delivery) {
            Ok(receipt) => ShopMessage::Purchased {
                item: offer.item().item.name.clone(),
                quantity: receipt.quantity,
            },
            Err(ShopError::InsufficientFunds { .. }) => ShopMessage::InsufficientFunds {
                item: offer.item().item.name.clone(),
                cost: offer.price().clone(),
            },
            Err(error) => {
                tracing::debug!(click_id, %error, "purchase click rejected");
                ShopMessage::Ignored
            }
        }
    }

    /// Empties the ledger into the world, as when the shop is broken.
    ///
    /// Each balance drops as stacks of its currency item. An id the catalog
    /// and registry no longer know drops as the primary currency. Returns the
    /// total number of items dropped.
    pub fn dispose(&self, catalog: &Catalog, registry: &dyn ItemRegistry, drops: &mut dyn DropSink) -> u64 {
        let mut balances: Vec<_> = self.ledger.clear().into_iter().collect();
        balances.sort_by(|a, b| a.0.cmp(&b.0));

        let mut total = 0u64;
        for (id, amount) in balances {
            let item = catalog
                .currency(id.as_str())
                .map(|currency| currency.item.clone())
                .or_else(|| registry.resolve(id.as_str()))
                .unwrap_or_else(|| {
                    tracing::warn!(currency = id.as_str(), "unknown currency; dropping primary currency instead");
                    catalog.primary_currency().item.clone()
                });

            let mut remaining = amount;
            while remaining > 0 {
                let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
                for piece in ItemStack::new(item.clone(), chunk).split_by_max_stack() {
                    drops.drop_at(self.position, piece);
                }
                remaining -= u64::from(chunk);
            }
            total = total.saturating_add(amount);
        }
        if total > 0 {
            tracing::info!(position = ?self.position, items = total, "shop contents dropped");
        }
        total
    }

    /// Writes the ledger into `tag`.
    pub fn save(&self, tag: &mut CompoundTag) {
        self.ledger.save(tag);
    }

    /// Restores a shop. A legacy single-count ledger is credited to the
    /// catalog's primary currency.
    #[must_use]
    pub fn load(position: Position, tag: &CompoundTag, catalog: &Catalog) -> Self {
        let ledger = Ledger::load(tag, Some(&catalog.primary_currency().id));
        Self::with_ledger(position, ledger)
    }

    /// Returns true, once, if the ledger changed since the last call.
    pub fn take_dirty(&self) -> bool {
        self.ledger.take_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::CURRENCY_COUNT_TAG;
    use crate::registry::{ItemHandle, StaticRegistry};
    use crate::transaction::InventorySink;

    struct Bottomless;

    impl InventorySink for Bottomless {
        fn try_insert(&mut self, mut stack: ItemStack) -> ItemStack {
            stack.count = 0;
            stack
        }
    }

    #[derive(Default)]
    struct Ground(Vec<ItemStack>);

    impl DropSink for Ground {
        fn drop_at(&mut self, _position: Position, stack: ItemStack) {
            self.0.push(stack);
        }
    }

    fn registry() -> StaticRegistry {
        let mut registry = StaticRegistry::with_items(["gold", "apple", "sword"]);
        registry.register("gem", 16);
        registry
    }

    fn catalog(registry: &StaticRegistry) -> Catalog {
        Catalog::parse(
            &["gold", "gem"],
            &["food", "arms"],
            &["apple|food|gold=2", "sword|arms|gold=3,gem=1"],
            registry,
        )
    }

    fn stack(registry: &StaticRegistry, name: &str, count: u32) -> ItemStack {
        ItemStack::new(registry.resolve(name).unwrap(), count)
    }

    #[test]
    fn test_open_without_offers() {
        let registry = registry();
        let empty = Catalog::parse(&["gold"], &["food"], &[] as &[&str], &registry);
        let shop = Shop::new([0, 0, 0]);
        assert_eq!(shop.open(&empty), ShopMessage::NoOffers);
        assert_eq!(shop.open(&catalog(&registry)), ShopMessage::MenuOpened { offers: 2 });
    }

    #[test]
    fn test_insert_only_matching_slot() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([0, 0, 0]);

        let rejected = shop.insert(&catalog, 1, stack(&registry, "gold", 5));
        assert_eq!(rejected.count, 5);
        let rejected = shop.insert(&catalog, 0, stack(&registry, "apple", 5));
        assert_eq!(rejected.count, 5);
        assert!(!shop.accepts(&catalog, 9, &stack(&registry, "gold", 1)));

        let taken = shop.insert(&catalog, 0, stack(&registry, "gold", 5));
        assert!(taken.is_empty());
        assert_eq!(shop.balances_for(&catalog), vec![5, 0]);
        assert!(shop.take_dirty());
    }

    #[test]
    fn test_click_purchase_and_shortfall() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([0, 0, 0]);
        shop.insert(&catalog, 0, stack(&registry, "gold", 5));

        let mut inventory = Bottomless;
        let mut ground = Ground::default();
        // 2 apples: 2 * 2 + 0
        let message = shop.handle_click(&catalog, 4, Delivery::new(&mut inventory, &mut ground, [0, 0, 0]));
        assert_eq!(
            message,
            ShopMessage::Purchased {
                item: "apple".to_string(),
                quantity: 2
            }
        );
        assert_eq!(shop.balances_for(&catalog), vec![1, 0]);

        // 1 sword: 1 * 2 + 1
        let message = shop.handle_click(&catalog, 3, Delivery::new(&mut inventory, &mut ground, [0, 0, 0]));
        match message {
            ShopMessage::InsufficientFunds { item, cost } => {
                assert_eq!(item, "sword");
                assert_eq!(cost.to_string(), "3 gold, 1 gem");
            }
            other => panic!("expected insufficient funds, got {other:?}"),
        }
        assert_eq!(shop.balances_for(&catalog), vec![1, 0]);
    }

    #[test]
    fn test_malformed_click_ignored() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([0, 0, 0]);
        let mut inventory = Bottomless;
        let mut ground = Ground::default();

        // quantity 0
        let message = shop.handle_click(&catalog, 1, Delivery::new(&mut inventory, &mut ground, [0, 0, 0]));
        assert_eq!(message, ShopMessage::Ignored);
    }

    #[test]
    fn test_purchase_by_index() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([0, 0, 0]);
        shop.insert(&catalog, 0, stack(&registry, "gold", 3));
        let mut inventory = Bottomless;
        let mut ground = Ground::default();

        let missing = shop.purchase(&catalog, 7, 1, Delivery::new(&mut inventory, &mut ground, [0, 0, 0]));
        assert_eq!(missing, Err(ShopError::OfferNotFound(7)));

        let receipt = shop
            .purchase(&catalog, 0, 1, Delivery::new(&mut inventory, &mut ground, [0, 0, 0]))
            .unwrap();
        assert_eq!(receipt.charged.get("gold"), 2);
        assert_eq!(shop.balances_for(&catalog), vec![1, 0]);
    }

    #[test]
    fn test_dispose_splits_by_stack_size() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([1, 2, 3]);
        shop.insert(&catalog, 0, stack(&registry, "gold", 130));
        shop.insert(&catalog, 1, stack(&registry, "gem", 20));

        let mut ground = Ground::default();
        assert_eq!(shop.dispose(&catalog, &registry, &mut ground), 150);

        let counts: Vec<(String, u32)> = ground.0.iter().map(|s| (s.item.name.clone(), s.count)).collect();
        assert_eq!(
            counts,
            vec![
                ("gem".to_string(), 16),
                ("gem".to_string(), 4),
                ("gold".to_string(), 64),
                ("gold".to_string(), 64),
                ("gold".to_string(), 2),
            ]
        );
        assert!(shop.ledger().is_empty());
    }

    #[test]
    fn test_dispose_unknown_currency_as_primary() {
        let registry = registry();
        let catalog = catalog(&registry);
        let mut ledger = Ledger::new();
        ledger.deposit(&"removed:coin".into(), 3);
        let shop = Shop::with_ledger([0, 0, 0], ledger);

        let mut ground = Ground::default();
        shop.dispose(&catalog, &registry, &mut ground);
        assert_eq!(ground.0, vec![ItemStack::new(registry.resolve("gold").unwrap(), 3)]);
    }

    #[test]
    fn test_legacy_load_credits_primary() {
        let registry = registry();
        let catalog = Catalog::parse(&["gold"], &["food"], &["apple|gold=2"], &registry);
        let mut tag = CompoundTag::new();
        tag.put_int(CURRENCY_COUNT_TAG, 7);

        let shop = Shop::load([0, 0, 0], &tag, &catalog);
        assert_eq!(shop.balances_for(&catalog), vec![7]);
        assert!(shop.take_dirty());

        let mut saved = CompoundTag::new();
        shop.save(&mut saved);
        let reloaded = Shop::load([0, 0, 0], &saved, &catalog);
        assert_eq!(reloaded.balances_for(&catalog), vec![7]);
        assert!(!reloaded.take_dirty());
    }

    #[test]
    fn test_unregistered_item_never_matches_slot() {
        let registry = registry();
        let catalog = catalog(&registry);
        let shop = Shop::new([0, 0, 0]);
        let fake = ItemStack::new(ItemHandle::unregistered("copper"), 3);
        assert!(!shop.accepts(&catalog, 0, &fake));
    }
}
