//! # Ledger
//!
//! Currency deposited into one shop.
//!
//! ## Guarantees
//!
//! 1. **Non-negative**: balances are unsigned; persisted negatives load as 0
//! 2. **Atomic withdrawal**: [`Ledger::try_withdraw`] deducts every currency
//!    or none of them
//! 3. **Nothing lost on reload**: ids the current catalog does not know are
//!    kept verbatim
//!
//! ## Persistence Layout
//!
//! ```text
//! Currencies: [ { Id: "minecraft:emerald", Count: 12 }, ... ]   (current)
//! Count: 7                                                       (legacy)
//! ```
//!
//! A legacy ledger is credited to the primary currency on load and marked
//! dirty so the host writes it back in the current layout.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::pricing::{AggregatedPrice, CurrencyId};
use crate::tag::{CompoundTag, Tag};

/// Key of the balance list.
pub const CURRENCIES_TAG: &str = "Currencies";
/// Key of a currency id inside a list entry.
pub const CURRENCY_ID_TAG: &str = "Id";
/// Key of a count inside a list entry, and of the legacy root count.
pub const CURRENCY_COUNT_TAG: &str = "Count";

/// Balances of one shop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    balances: HashMap<CurrencyId, u64>,
    dirty: bool,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `currency`; 0 if absent.
    #[must_use]
    pub fn balance(&self, currency: &str) -> u64 {
        self.balances.get(currency).copied().unwrap_or(0)
    }

    /// Adds `amount` of `currency`. Zero is a no-op.
    pub fn deposit(&mut self, currency: &CurrencyId, amount: u64) {
        if amount == 0 {
            return;
        }
        let balance = self.balances.entry(currency.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.dirty = true;
    }

    /// Deducts every entry of `totals` if all of them are covered.
    ///
    /// **ATOMIC**: returns `false` and changes nothing if any single currency
    /// is short.
    pub fn try_withdraw(&mut self, totals: &AggregatedPrice) -> bool {
        for (currency, amount) in totals.iter() {
            if self.balance(currency.as_str()) < amount {
                return false;
            }
        }
        for (currency, amount) in totals.iter() {
            if amount == 0 {
                continue;
            }
            if let Some(balance) = self.balances.get_mut(currency.as_str()) {
                *balance -= amount;
            }
        }
        self.dirty = true;
        true
    }

    /// Empties the ledger, returning what it held.
    pub fn clear(&mut self) -> HashMap<CurrencyId, u64> {
        let drained = std::mem::take(&mut self.balances);
        if !drained.is_empty() {
            self.dirty = true;
        }
        drained.into_iter().filter(|(_, amount)| *amount > 0).collect()
    }

    /// Returns true if every balance is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.values().all(|amount| *amount == 0)
    }

    /// Iterates `(currency, balance)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyId, u64)> {
        self.balances.iter().map(|(id, amount)| (id, *amount))
    }

    /// Returns true if the ledger changed since it was last saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning its previous value.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Writes the balances under [`CURRENCIES_TAG`], sorted by id.
    pub fn save(&self, tag: &mut CompoundTag) {
        let mut entries: Vec<(&CurrencyId, u64)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let list = entries
            .into_iter()
            .map(|(id, amount)| {
                let mut entry = CompoundTag::new();
                entry.put_string(CURRENCY_ID_TAG, id.as_str());
                entry.put_int(CURRENCY_COUNT_TAG, i64::try_from(amount).unwrap_or(i64::MAX));
                Tag::Compound(entry)
            })
            .collect();
        tag.put(CURRENCIES_TAG, Tag::List(list));
    }

    /// Reads balances written by [`Self::save`], or the legacy single count.
    ///
    /// `legacy_currency` receives a legacy count; without one the count is
    /// ignored. Unknown ids are kept as-is. Negative counts load as 0.
    #[must_use]
    pub fn load(tag: &CompoundTag, legacy_currency: Option<&CurrencyId>) -> Self {
        let mut ledger = Self::new();

        if let Some(list) = tag.get_list(CURRENCIES_TAG) {
            for entry in list {
                let Tag::Compound(entry) = entry else {
                    continue;
                };
                let Some(id) = entry.get_string(CURRENCY_ID_TAG).map(str::trim) else {
                    continue;
                };
                if id.is_empty() {
                    continue;
                }
                let count = clamp_count(entry.get_int(CURRENCY_COUNT_TAG).unwrap_or(0));
                let balance = ledger.balances.entry(CurrencyId::new(id)).or_insert(0);
                *balance = balance.saturating_add(count);
            }
        } else if let Some(count) = tag.get_int(CURRENCY_COUNT_TAG) {
            match legacy_currency {
                Some(currency) => {
                    tracing::info!(
                        currency = currency.as_str(),
                        count,
                        "upgrading legacy single-currency ledger"
                    );
                    ledger.balances.insert(currency.clone(), clamp_count(count));
                    ledger.dirty = true;
                }
                None => {
                    tracing::warn!(count, "legacy ledger count has no currency to belong to");
                }
            }
        }

        ledger
    }
}

fn clamp_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// A ledger behind a lock.
///
/// Every mutating call takes the lock once, so a withdrawal's check and
/// deduct never interleave with another caller.
#[derive(Debug, Default)]
pub struct SharedLedger {
    inner: Mutex<Ledger>,
}

impl SharedLedger {
    /// Wraps a ledger.
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Mutex::new(ledger),
        }
    }

    /// Balance of `currency`.
    #[must_use]
    pub fn balance(&self, currency: &str) -> u64 {
        self.inner.lock().balance(currency)
    }

    /// See [`Ledger::deposit`].
    pub fn deposit(&self, currency: &CurrencyId, amount: u64) {
        self.inner.lock().deposit(currency, amount);
    }

    /// See [`Ledger::try_withdraw`].
    pub fn try_withdraw(&self, totals: &AggregatedPrice) -> bool {
        self.inner.lock().try_withdraw(totals)
    }

    /// See [`Ledger::clear`].
    pub fn clear(&self) -> HashMap<CurrencyId, u64> {
        self.inner.lock().clear()
    }

    /// Returns true if every balance is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`Ledger::take_dirty`].
    pub fn take_dirty(&self) -> bool {
        self.inner.lock().take_dirty()
    }

    /// See [`Ledger::save`].
    pub fn save(&self, tag: &mut CompoundTag) {
        self.inner.lock().save(tag);
    }

    /// Copies the current ledger.
    #[must_use]
    pub fn snapshot(&self) -> Ledger {
        self.inner.lock().clone()
    }

    /// Runs `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
