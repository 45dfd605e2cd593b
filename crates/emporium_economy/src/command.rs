//! # Purchase Command
//!
//! A purchase request packed into one integer click id:
//!
//! ```text
//! click_id = quantity * offer_count + offer_index
//! ```
//!
//! Both sides must agree on `offer_count`, which is the length of the catalog
//! snapshot the client received. Decoding never fails loudly; a bad id is
//! simply `None`.

/// A decoded purchase request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PurchaseCommand {
    /// Index into the catalog's offer list.
    pub offer_index: usize,
    /// Units requested. Positive in every valid command.
    pub quantity: u32,
}

impl PurchaseCommand {
    /// Creates a command.
    #[inline]
    #[must_use]
    pub const fn new(offer_index: usize, quantity: u32) -> Self {
        Self { offer_index, quantity }
    }

    /// Packs the command for a catalog of `offer_count` offers.
    ///
    /// Returns `None` for a zero quantity, an out-of-range index, or an id
    /// that does not fit in a `u32`.
    #[must_use]
    pub fn encode(&self, offer_count: usize) -> Option<u32> {
        if self.quantity == 0 || self.offer_index >= offer_count {
            return None;
        }
        let count = u32::try_from(offer_count).ok()?;
        let index = u32::try_from(self.offer_index).ok()?;
        self.quantity.checked_mul(count)?.checked_add(index)
    }

    /// Unpacks a click id for a catalog of `offer_count` offers.
    ///
    /// Returns `None` for an empty catalog or a zero quantity. The index is
    /// always in range by construction.
    #[must_use]
    pub fn decode(click_id: u32, offer_count: usize) -> Option<Self> {
        let count = u32::try_from(offer_count).ok().filter(|c| *c > 0)?;
        let quantity = click_id / count;
        if quantity == 0 {
            return None;
        }
        let offer_index = usize::try_from(click_id % count).ok()?;
        Some(Self { offer_index, quantity })
    }
}
