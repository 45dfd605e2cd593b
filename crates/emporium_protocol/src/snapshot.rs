//! # Catalog Snapshot
//!
//! What the client needs to render a shop: currencies, categories and offers,
//! in catalog order. Offer positions in [`CatalogSnapshot::offers`] are the
//! indices click ids refer to.

use emporium_economy::{aggregate, AggregatedPrice, Catalog, CurrencyId, Position, PriceRequirement};

use crate::codec::{WireReader, WireWriter};

/// One offer as the client sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotOffer {
    /// Item identifier.
    pub item: String,
    /// Items delivered per unit.
    pub count: u32,
    /// Category label.
    pub category: String,
    /// Unit prices, in configuration order.
    pub prices: Vec<PriceRequirement>,
}

impl SnapshotOffer {
    /// Per-unit price, summed per currency.
    #[must_use]
    pub fn price(&self) -> AggregatedPrice {
        aggregate(&self.prices)
    }
}

/// A shop catalog as sent to a client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Shop position.
    pub position: Position,
    /// Currency ids, in slot order.
    pub currencies: Vec<CurrencyId>,
    /// Category labels, in display order.
    pub categories: Vec<String>,
    /// Offers, in catalog order.
    pub offers: Vec<SnapshotOffer>,
}

impl CatalogSnapshot {
    /// Captures `catalog` for the shop at `position`.
    #[must_use]
    pub fn from_catalog(position: Position, catalog: &Catalog) -> Self {
        Self {
            position,
            currencies: catalog.currencies().iter().map(|c| c.id.clone()).collect(),
            categories: catalog.categories().to_vec(),
            offers: catalog
                .offers()
                .iter()
                .map(|offer| SnapshotOffer {
                    item: offer.item().item.name.clone(),
                    count: offer.item().count,
                    category: offer.category().to_string(),
                    prices: offer.prices().to_vec(),
                })
                .collect(),
        }
    }

    /// Per-unit prices, index-aligned with [`Self::offers`].
    #[must_use]
    pub fn prices(&self) -> Vec<AggregatedPrice> {
        self.offers.iter().map(SnapshotOffer::price).collect()
    }

    /// Offers in `category`, with their indices.
    pub fn offers_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (usize, &'a SnapshotOffer)> + 'a {
        self.offers
            .iter()
            .enumerate()
            .filter(move |(_, offer)| offer.category == category)
    }

    /// Writes the snapshot body. Returns false if a string is too long.
    pub fn write(&self, writer: &mut WireWriter) -> bool {
        for coordinate in self.position {
            writer.write_var_i32(coordinate);
        }

        if !writer.write_len(self.currencies.len()) {
            return false;
        }
        for currency in &self.currencies {
            if !writer.write_string(currency.as_str()) {
                return false;
            }
        }

        if !writer.write_len(self.categories.len()) {
            return false;
        }
        for category in &self.categories {
            if !writer.write_string(category) {
                return false;
            }
        }

        if !writer.write_len(self.offers.len()) {
            return false;
        }
        for offer in &self.offers {
            if !writer.write_string(&offer.item) {
                return false;
            }
            writer.write_var_u32(offer.count);
            if !(writer.write_string(&offer.category) && writer.write_len(offer.prices.len())) {
                return false;
            }
            for price in &offer.prices {
                if !writer.write_string(price.currency.as_str()) {
                    return false;
                }
                writer.write_var_u32(price.unit_price);
            }
        }
        true
    }

    /// Reads a snapshot body.
    ///
    /// Price pairs naming a currency outside the snapshot's currency list, or
    /// priced at 0, are dropped. The offer itself is kept so indices stay
    /// aligned with the server; with no price left it simply affords nothing.
    pub fn read(reader: &mut WireReader<'_>) -> Option<Self> {
        let position = [reader.read_var_i32()?, reader.read_var_i32()?, reader.read_var_i32()?];

        let currency_count = reader.read_len(1)?;
        let mut currencies = Vec::with_capacity(currency_count);
        for _ in 0..currency_count {
            currencies.push(CurrencyId::new(reader.read_string()?));
        }

        let category_count = reader.read_len(1)?;
        let mut categories = Vec::with_capacity(category_count);
        for _ in 0..category_count {
            categories.push(reader.read_string()?);
        }

        // item, count, category, price count: at least one byte each
        let offer_count = reader.read_len(4)?;
        let mut offers = Vec::with_capacity(offer_count);
        for _ in 0..offer_count {
            let item = reader.read_string()?;
            let count = reader.read_var_u32()?;
            let category = reader.read_string()?;
            let price_count = reader.read_len(2)?;
            let mut prices = Vec::with_capacity(price_count);
            for _ in 0..price_count {
                let currency = reader.read_string()?;
                let unit_price = reader.read_var_u32()?;
                if unit_price == 0 || !currencies.iter().any(|c| c.as_str() == currency) {
                    tracing::debug!(item = item.as_str(), currency = currency.as_str(), unit_price, "dropping price entry");
                    continue;
                }
                prices.push(PriceRequirement::new(CurrencyId::new(currency), unit_price));
            }
            offers.push(SnapshotOffer {
                item,
                count,
                category,
                prices,
            });
        }

        Some(Self {
            position,
            currencies,
            categories,
            offers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_economy::StaticRegistry;

    fn catalog() -> Catalog {
        let registry = StaticRegistry::with_items(["gold", "gem", "apple", "sword"]);
        Catalog::parse(
            &["gold", "gem"],
            &["food", "arms"],
            &["apple|food|gold=2", "sword|arms|gold=3,gem=1,gold=1"],
            &registry,
        )
    }

    #[test]
    fn test_from_catalog_keeps_order() {
        let snapshot = CatalogSnapshot::from_catalog([1, -2, 3], &catalog());
        assert_eq!(snapshot.currencies, vec![CurrencyId::from("gold"), CurrencyId::from("gem")]);
        assert_eq!(snapshot.offers[1].item, "sword");
        // duplicate currency entries survive until aggregation
        assert_eq!(snapshot.offers[1].prices.len(), 3);
        assert_eq!(snapshot.prices()[1].get("gold"), 4);
    }

    #[test]
    fn test_wire_round_trip() {
        let snapshot = CatalogSnapshot::from_catalog([1, -2, 3], &catalog());
        let mut writer = WireWriter::new();
        assert!(snapshot.write(&mut writer));

        let mut reader = WireReader::new(writer.as_slice());
        assert_eq!(CatalogSnapshot::read(&mut reader), Some(snapshot));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_unknown_currency_price_dropped() {
        let mut snapshot = CatalogSnapshot::from_catalog([0, 0, 0], &catalog());
        snapshot.offers[0].prices = vec![
            PriceRequirement::new("ruby", 4),
            PriceRequirement::new("gold", 0),
        ];
        snapshot.offers[1].prices.push(PriceRequirement::new("ruby", 9));
        let mut writer = WireWriter::new();
        assert!(snapshot.write(&mut writer));

        let decoded = CatalogSnapshot::read(&mut WireReader::new(writer.as_slice())).unwrap();
        // offer kept, but unpriced
        assert_eq!(decoded.offers.len(), 2);
        assert!(decoded.offers[0].prices.is_empty());
        assert!(decoded.offers[0].price().is_empty());
        assert_eq!(decoded.offers[1].prices.len(), 3);
    }

    #[test]
    fn test_truncated_snapshot() {
        let snapshot = CatalogSnapshot::from_catalog([0, 0, 0], &catalog());
        let mut writer = WireWriter::new();
        snapshot.write(&mut writer);
        let bytes = writer.into_bytes();
        for cut in [0, 3, bytes.len() / 2, bytes.len() - 1] {
            assert_eq!(CatalogSnapshot::read(&mut WireReader::new(&bytes[..cut])), None);
        }
    }

    #[test]
    fn test_offers_in_category() {
        let snapshot = CatalogSnapshot::from_catalog([0, 0, 0], &catalog());
        let arms: Vec<usize> = snapshot.offers_in_category("arms").map(|(i, _)| i).collect();
        assert_eq!(arms, vec![1]);
    }
}
