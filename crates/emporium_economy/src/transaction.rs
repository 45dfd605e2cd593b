//! # Transaction Engine
//!
//! **Authoritative purchase settlement.**
//!
//! 1. **Validate**: quantity > 0, offer priced, no overflow in cost or stack
//! 2. **Withdraw**: one all-or-nothing [`Ledger::try_withdraw`]
//! 3. **Deliver**: hand goods to the inventory, drop whatever does not fit
//!
//! Steps 1 and 2 either both succeed or leave the ledger untouched. Step 3 is
//! best-effort: a degraded delivery never refunds currency and never destroys
//! goods.

use crate::catalog::Offer;
use crate::error::{ShopError, ShopResult};
use crate::ledger::{Ledger, SharedLedger};
use crate::pricing::AggregatedPrice;
use crate::registry::ItemStack;

/// Block position of a shop in the host world.
pub type Position = [i32; 3];

/// The buyer's inventory.
pub trait InventorySink {
    /// Inserts as much of `stack` as fits and returns the rest.
    fn try_insert(&mut self, stack: ItemStack) -> ItemStack;
}

/// Places items in the world.
pub trait DropSink {
    /// Drops `stack` at `position`.
    fn drop_at(&mut self, position: Position, stack: ItemStack);
}

/// Where purchased goods go.
pub struct Delivery<'a> {
    /// Tried first.
    pub inventory: &'a mut dyn InventorySink,
    /// Receives whatever the inventory rejects.
    pub drops: &'a mut dyn DropSink,
    /// Drop location.
    pub position: Position,
}

impl<'a> Delivery<'a> {
    /// Creates a delivery target.
    pub fn new(inventory: &'a mut dyn InventorySink, drops: &'a mut dyn DropSink, position: Position) -> Self {
        Self {
            inventory,
            drops,
            position,
        }
    }

    /// Inserts `stack` piece by piece, dropping leftovers.
    ///
    /// Returns `(inserted, dropped)` item counts.
    fn deliver(&mut self, stack: &ItemStack) -> (u32, u32) {
        let mut inserted = 0;
        let mut dropped = 0;
        for piece in stack.split_by_max_stack() {
            let offered = piece.count;
            let leftover = self.inventory.try_insert(piece);
            let rest = leftover.count.min(offered);
            inserted += offered - rest;
            if rest > 0 {
                dropped += rest;
                self.drops.drop_at(self.position, leftover);
            }
        }
        (inserted, dropped)
    }
}

/// Outcome of a settled purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Units bought.
    pub quantity: u32,
    /// Currency withdrawn.
    pub charged: AggregatedPrice,
    /// Goods handed out.
    pub delivered: ItemStack,
    /// Items that went into the inventory.
    pub inserted: u32,
    /// Items dropped at the shop.
    pub dropped: u32,
}

/// Total cost of `quantity` units of `offer`. Touches nothing.
///
/// # Errors
///
/// - `ShopError::InvalidQuantity` if `quantity` is 0
/// - `ShopError::UnpricedOffer` if the offer has no price
/// - `ShopError::QuantityOverflow` if the total overflows
pub fn quote(offer: &Offer, quantity: u32) -> ShopResult<AggregatedPrice> {
    if quantity == 0 {
        return Err(ShopError::InvalidQuantity(quantity));
    }
    if offer.price().is_empty() {
        return Err(ShopError::UnpricedOffer);
    }
    offer.price().scaled(quantity).ok_or(ShopError::QuantityOverflow)
}

/// Stack delivered for `quantity` units of `offer`.
fn delivered_stack(offer: &Offer, quantity: u32) -> ShopResult<ItemStack> {
    let count = offer
        .item()
        .count
        .checked_mul(quantity)
        .ok_or(ShopError::QuantityOverflow)?;
    Ok(ItemStack::new(offer.item().item.clone(), count))
}

/// Buys `quantity` units of `offer` from `ledger`.
///
/// # Errors
///
/// Everything [`quote`] returns, plus `ShopError::InsufficientFunds` if any
/// currency is short. The ledger is unchanged on every error.
pub fn purchase(offer: &Offer, quantity: u32, ledger: &mut Ledger, delivery: Delivery<'_>) -> ShopResult<Receipt> {
    settle(offer, quantity, |total| ledger.try_withdraw(total), delivery)
}

/// [`purchase`] against a shared ledger. The lock is held only for the
/// withdrawal, not during delivery.
///
/// # Errors
///
/// Same as [`purchase`].
pub fn purchase_shared(
    offer: &Offer,
    quantity: u32,
    ledger: &SharedLedger,
    delivery: Delivery<'_>,
) -> ShopResult<Receipt> {
    settle(offer, quantity, |total| ledger.try_withdraw(total), delivery)
}

fn settle(
    offer: &Offer,
    quantity: u32,
    withdraw: impl FnOnce(&AggregatedPrice) -> bool,
    mut delivery: Delivery<'_>,
) -> ShopResult<Receipt> {
    let charged = quote(offer, quantity)?;
    let delivered = delivered_stack(offer, quantity)?;

    if !withdraw(&charged) {
        tracing::debug!(
            item = offer.item().item.name.as_str(),
            quantity,
            required = %charged,
            "purchase rejected: insufficient funds"
        );
        return Err(ShopError::InsufficientFunds { required: charged });
    }

    let (inserted, dropped) = delivery.deliver(&delivered);
    tracing::info!(
        item = offer.item().item.name.as_str(),
        quantity,
        charged = %charged,
        inserted,
        dropped,
        "purchase settled"
    );

    Ok(Receipt {
        quantity,
        charged,
        delivered,
        inserted,
        dropped,
    })
}
