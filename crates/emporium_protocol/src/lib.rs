//! # EMPORIUM Protocol
//!
//! Shop packets between the authoritative server and a client preview.
//!
//! ## Flow
//!
//! ```text
//! CLIENT                                  SERVER
//!   |<-- CatalogSnapshot (menu opened) ------|
//!   |<-- BalanceUpdate (on every change) ----|
//!   |                                        |
//!   |  preview: reservation-aware max        |
//!   |                                        |
//!   |--- PurchaseClick(quantity*n+index) --->|
//!   |                                        | <- Shop::handle_click re-validates
//!   |<-- BalanceUpdate ----------------------|
//! ```
//!
//! The client never settles anything. A stale or forged click is decoded
//! against the server's catalog and ignored if it does not fit.
//!
//! ## Example
//!
//! ```rust,ignore
//! use emporium_protocol::{ClientShopView, ShopPacket};
//!
//! let bytes = ShopPacket::snapshot(shop.position(), &catalog).encode()?;
//! let Some(ShopPacket::CatalogSnapshot(snapshot)) = ShopPacket::decode(&bytes) else { return };
//! let mut view = ClientShopView::new(snapshot);
//! view.adjust(0, 4);
//! let click = view.purchase(0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod client;
pub mod codec;
pub mod packets;
pub mod snapshot;

pub use client::ClientShopView;
pub use codec::{WireReader, WireWriter, MAX_STRING_LEN};
pub use packets::{BalanceUpdate, PacketType, ShopPacket};
pub use snapshot::{CatalogSnapshot, SnapshotOffer};
