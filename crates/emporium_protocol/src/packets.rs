//! # Shop Packets
//!
//! Every packet is one type byte followed by its body.
//!
//! | Type | Direction        | Body                                     |
//! |------|------------------|------------------------------------------|
//! | 0    | server -> client | [`CatalogSnapshot`]                      |
//! | 1    | server -> client | balances, aligned with snapshot currencies |
//! | 2    | client -> server | packed purchase click id                 |

use emporium_economy::{Catalog, Position, Shop};

use crate::codec::{WireReader, WireWriter};
use crate::snapshot::CatalogSnapshot;

/// Packet type identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Server -> Client: full catalog.
    CatalogSnapshot = 0,
    /// Server -> Client: current shop balances.
    BalanceUpdate = 1,
    /// Client -> Server: purchase request.
    PurchaseClick = 2,
}

impl PacketType {
    /// Maps a type byte back to a packet type.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::CatalogSnapshot),
            1 => Some(Self::BalanceUpdate),
            2 => Some(Self::PurchaseClick),
            _ => None,
        }
    }
}

/// Balances of one shop, in the order of the snapshot's currencies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// One count per snapshot currency.
    pub counts: Vec<u64>,
}

impl BalanceUpdate {
    /// Captures `shop`'s balances in `catalog` currency order.
    #[must_use]
    pub fn from_shop(shop: &Shop, catalog: &Catalog) -> Self {
        Self {
            counts: shop.balances_for(catalog),
        }
    }
}

/// A decoded shop packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopPacket {
    /// Catalog for a freshly opened menu.
    CatalogSnapshot(CatalogSnapshot),
    /// Shop balances changed.
    BalanceUpdate(BalanceUpdate),
    /// Purchase request as a packed click id.
    PurchaseClick(u32),
}

impl ShopPacket {
    /// Snapshot packet for the shop at `position`.
    #[must_use]
    pub fn snapshot(position: Position, catalog: &Catalog) -> Self {
        Self::CatalogSnapshot(CatalogSnapshot::from_catalog(position, catalog))
    }

    /// Type byte of this packet.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::CatalogSnapshot(_) => PacketType::CatalogSnapshot,
            Self::BalanceUpdate(_) => PacketType::BalanceUpdate,
            Self::PurchaseClick(_) => PacketType::PurchaseClick,
        }
    }

    /// Encodes the packet.
    ///
    /// Returns `None` if a string in the packet exceeds the wire limit.
    #[must_use]
    pub fn encode(&self) -> Option<Vec<u8>> {
        let mut writer = WireWriter::new();
        writer.write_u8(self.packet_type() as u8);
        let written = match self {
            Self::CatalogSnapshot(snapshot) => snapshot.write(&mut writer),
            Self::BalanceUpdate(update) => {
                let ok = writer.write_len(update.counts.len());
                for count in &update.counts {
                    writer.write_var_u64(*count);
                }
                ok
            }
            Self::PurchaseClick(click_id) => {
                writer.write_var_u32(*click_id);
                true
            }
        };
        if !written {
            tracing::warn!(packet = ?self.packet_type(), "packet too large to encode");
            return None;
        }
        Some(writer.into_bytes())
    }

    /// Decodes a packet. Unknown types and truncated bodies are `None`.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let mut reader = WireReader::new(bytes);
        let packet = match PacketType::from_u8(reader.read_u8()?)? {
            PacketType::CatalogSnapshot => Self::CatalogSnapshot(CatalogSnapshot::read(&mut reader)?),
            PacketType::BalanceUpdate => {
                let len = reader.read_len(1)?;
                let mut counts = Vec::with_capacity(len);
                for _ in 0..len {
                    counts.push(reader.read_var_u64()?);
                }
                Self::BalanceUpdate(BalanceUpdate { counts })
            }
            PacketType::PurchaseClick => Self::PurchaseClick(reader.read_var_u32()?),
        };
        Some(packet)
    }
}
