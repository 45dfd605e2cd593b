//! # EMPORIUM Economy
//!
//! Multi-currency shop logic: a configuration-driven catalog, per-shop
//! currency ledgers and all-or-nothing purchases.
//!
//! ## Design Principles
//!
//! 1. **Integer money** - prices and balances are whole units, never floats
//! 2. **All-or-nothing settlement** - a purchase withdraws every currency or none
//! 3. **Forgiving configuration** - bad entries are dropped with a warning
//! 4. **Stable order** - catalog order is the wire order; click ids index into it
//!
//! ## Thread Safety
//!
//! Each [`Shop`] guards its ledger with one lock. The affordability planner is
//! read-only and runs on client-side copies of the balances.
//!
//! ## Example
//!
//! ```rust,ignore
//! use emporium_economy::{Catalog, Shop, ShopConfig};
//!
//! let config = ShopConfig::load("config/emporium-server.toml")?;
//! let catalog = Catalog::from_config(&config, &registry);
//!
//! let shop = Shop::new([10, 64, -3]);
//! shop.insert(&catalog, 0, emeralds);
//! let message = shop.handle_click(&catalog, click_id, delivery);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod affordability;
pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod registry;
pub mod selection;
pub mod shop;
pub mod tag;
pub mod transaction;

pub use affordability::{affordable_all, affordable_excluding, BalanceSnapshot, BalanceView, Reservation};
pub use catalog::{Catalog, CategoryResolution, DropReason, Offer, OfferEntry, PriceIssue};
pub use command::PurchaseCommand;
pub use config::ShopConfig;
pub use error::{ShopError, ShopResult};
pub use ledger::{Ledger, SharedLedger};
pub use pricing::{aggregate, AggregatedPrice, Currency, CurrencyId, PriceRequirement};
pub use registry::{ItemHandle, ItemId, ItemRegistry, ItemStack, StaticRegistry};
pub use selection::SelectionState;
pub use shop::{Shop, ShopMessage};
pub use tag::{CompoundTag, Tag};
pub use transaction::{purchase, purchase_shared, quote, Delivery, DropSink, InventorySink, Position, Receipt};
