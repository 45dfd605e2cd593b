//! # Catalog Parser
//!
//! Turns the three configuration lists into a validated [`Catalog`].
//!
//! ## Offer Grammar
//!
//! ```text
//! offer    := item "|" category "|" prices
//!           | item "|" prices
//! prices   := price ("," price)*
//! price    := currency "=" positive-integer
//! ```
//!
//! ## Fallback Policy
//!
//! Nothing in here fails. Bad entries are dropped with a warning and global
//! fallbacks guarantee at least one currency and one category:
//!
//! - no valid currency -> [`FALLBACK_CURRENCY`]
//! - no valid category -> [`FALLBACK_CATEGORY`]
//! - unknown or missing offer category -> first configured category
//! - bad price token -> token dropped; no token left -> offer dropped
//!
//! Output order mirrors configuration order. Click ids and wire snapshots
//! index into it, so parsing the same input twice must yield the same catalog.

use thiserror::Error;

use crate::config::ShopConfig;
use crate::pricing::{aggregate, AggregatedPrice, Currency, CurrencyId, PriceRequirement};
use crate::registry::{ItemHandle, ItemRegistry, ItemStack};

/// Currency injected when no configured currency resolves.
pub const FALLBACK_CURRENCY: &str = "minecraft:emerald";

/// Category injected when no configured category survives trimming.
pub const FALLBACK_CATEGORY: &str = "default";

/// A purchasable offer. Immutable; rebuilt on every catalog load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Offer {
    item: ItemStack,
    prices: Vec<PriceRequirement>,
    category: String,
    price: AggregatedPrice,
}

impl Offer {
    /// Creates an offer delivering `item` per purchase unit.
    #[must_use]
    pub fn new(item: ItemStack, prices: Vec<PriceRequirement>, category: impl Into<String>) -> Self {
        let price = aggregate(&prices);
        Self {
            item,
            prices,
            category: category.into(),
            price,
        }
    }

    /// Stack delivered per purchase unit.
    #[must_use]
    pub fn item(&self) -> &ItemStack {
        &self.item
    }

    /// Price requirements in configuration order.
    #[must_use]
    pub fn prices(&self) -> &[PriceRequirement] {
        &self.prices
    }

    /// Resolved category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Per-unit price, summed per currency.
    #[must_use]
    pub fn price(&self) -> &AggregatedPrice {
        &self.price
    }
}

/// Outcome of resolving an offer's declared category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryResolution {
    /// Declared category is configured.
    Configured(String),
    /// Declared category is not configured.
    Unrecognized {
        /// What the offer asked for.
        declared: String,
        /// What it got.
        fallback: String,
    },
    /// Offer declared no category.
    Missing {
        /// What it got.
        fallback: String,
    },
}

impl CategoryResolution {
    /// The category the offer ends up in.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Configured(category) => category,
            Self::Unrecognized { fallback, .. } | Self::Missing { fallback } => fallback,
        }
    }
}

/// Resolves a declared category against the configured list.
#[must_use]
pub fn resolve_category(declared: &str, categories: &[String]) -> CategoryResolution {
    let trimmed = declared.trim();
    if !trimmed.is_empty() && categories.iter().any(|c| c == trimmed) {
        return CategoryResolution::Configured(trimmed.to_string());
    }
    let fallback = categories
        .first()
        .map_or_else(|| FALLBACK_CATEGORY.to_string(), Clone::clone);
    if trimmed.is_empty() {
        CategoryResolution::Missing { fallback }
    } else {
        CategoryResolution::Unrecognized {
            declared: trimmed.to_string(),
            fallback,
        }
    }
}

/// Why a single price token was ignored.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum PriceIssue {
    /// Token has no `=`.
    #[error("unrecognized price entry '{0}'")]
    Unrecognized(String),
    /// Currency is not a known item.
    #[error("invalid currency '{0}'")]
    UnknownCurrency(String),
    /// Currency is a known item but not a configured currency.
    #[error("'{0}' is not a configured currency")]
    UnconfiguredCurrency(String),
    /// Price is not an integer.
    #[error("invalid price '{0}'")]
    InvalidPrice(String),
    /// Price is zero or negative.
    #[error("non-positive price {0}")]
    NonPositive(i32),
}

/// Why a whole offer was dropped.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// No `|` separator.
    #[error("missing price section")]
    MissingPriceSection,
    /// Item does not resolve.
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    /// Every price token was invalid.
    #[error("no valid price")]
    NoValidPrices,
}

/// Result of parsing one offer string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OfferEntry {
    /// The offer is valid.
    Accepted(Offer),
    /// The offer was dropped.
    Dropped {
        /// The raw configuration string.
        raw: String,
        /// Why.
        reason: DropReason,
    },
}

/// Parses the currency list. Falls back to [`FALLBACK_CURRENCY`] if nothing
/// resolves.
pub fn parse_currencies(entries: &[impl AsRef<str>], registry: &dyn ItemRegistry) -> Vec<Currency> {
    let mut currencies: Vec<Currency> = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.as_ref().trim();
        let Some(item) = registry.resolve(name) else {
            tracing::warn!(currency = name, "ignoring unknown currency item");
            continue;
        };
        if currencies.iter().any(|c| c.id.as_str() == name) {
            tracing::warn!(currency = name, "ignoring duplicate currency");
            continue;
        }
        currencies.push(Currency {
            id: CurrencyId::new(name),
            item,
        });
    }

    if currencies.is_empty() {
        tracing::warn!(fallback = FALLBACK_CURRENCY, "no valid currency configured");
        let item = registry
            .resolve(FALLBACK_CURRENCY)
            .unwrap_or_else(|| ItemHandle::unregistered(FALLBACK_CURRENCY));
        currencies.push(Currency {
            id: CurrencyId::new(FALLBACK_CURRENCY),
            item,
        });
    }
    currencies
}

/// Parses the category list. Falls back to [`FALLBACK_CATEGORY`] if every
/// entry is blank.
#[must_use]
pub fn parse_categories(entries: &[impl AsRef<str>]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let category = entry.as_ref().trim();
        if category.is_empty() {
            continue;
        }
        if categories.iter().any(|c| c == category) {
            tracing::warn!(category, "ignoring duplicate category");
            continue;
        }
        categories.push(category.to_string());
    }
    if categories.is_empty() {
        categories.push(FALLBACK_CATEGORY.to_string());
    }
    categories
}

/// Parses one `currency=price` token.
///
/// Returns `None` for a blank token.
pub fn parse_price_token(
    token: &str,
    currencies: &[Currency],
    registry: &dyn ItemRegistry,
) -> Option<Result<PriceRequirement, PriceIssue>> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let Some((currency, price)) = token.split_once('=') else {
        return Some(Err(PriceIssue::Unrecognized(token.to_string())));
    };
    let currency = currency.trim();
    let price = price.trim();

    if registry.resolve(currency).is_none() {
        return Some(Err(PriceIssue::UnknownCurrency(currency.to_string())));
    }
    let Some(configured) = currencies.iter().find(|c| c.id.as_str() == currency) else {
        return Some(Err(PriceIssue::UnconfiguredCurrency(currency.to_string())));
    };
    let parsed = match price.parse::<i32>() {
        Ok(value) => value,
        Err(_) => return Some(Err(PriceIssue::InvalidPrice(price.to_string()))),
    };
    let Ok(unit_price) = u32::try_from(parsed) else {
        return Some(Err(PriceIssue::NonPositive(parsed)));
    };
    if unit_price == 0 {
        return Some(Err(PriceIssue::NonPositive(parsed)));
    }
    Some(Ok(PriceRequirement {
        currency: configured.id.clone(),
        unit_price,
    }))
}

/// Parses one offer string.
///
/// Bad price tokens and category fallbacks are logged here; the caller logs
/// dropped offers.
pub fn parse_offer(
    raw: &str,
    categories: &[String],
    currencies: &[Currency],
    registry: &dyn ItemRegistry,
) -> OfferEntry {
    let dropped = |reason| OfferEntry::Dropped {
        raw: raw.to_string(),
        reason,
    };

    let parts: Vec<&str> = raw.splitn(3, '|').collect();
    let (item_token, declared_category, price_section) = match parts.as_slice() {
        [item, category, prices] => (*item, *category, *prices),
        [item, prices] => (*item, "", *prices),
        _ => return dropped(DropReason::MissingPriceSection),
    };

    let item_token = item_token.trim();
    let Some(item) = registry.resolve(item_token) else {
        return dropped(DropReason::UnknownItem(item_token.to_string()));
    };

    let mut prices = Vec::new();
    for token in price_section.split(',') {
        match parse_price_token(token, currencies, registry) {
            Some(Ok(requirement)) => prices.push(requirement),
            Some(Err(issue)) => {
                tracing::warn!(offer = raw, %issue, "ignoring price entry");
            }
            None => {}
        }
    }
    if prices.is_empty() {
        return dropped(DropReason::NoValidPrices);
    }

    let resolution = resolve_category(declared_category, categories);
    match &resolution {
        CategoryResolution::Configured(_) => {}
        CategoryResolution::Unrecognized { declared, fallback } => {
            tracing::warn!(
                offer = raw,
                category = declared.as_str(),
                fallback = fallback.as_str(),
                "category is not configured; using fallback"
            );
        }
        CategoryResolution::Missing { fallback } => {
            tracing::warn!(
                offer = raw,
                fallback = fallback.as_str(),
                "offer has no category (expected item|category|prices); using fallback"
            );
        }
    }

    OfferEntry::Accepted(Offer::new(
        ItemStack::new(item, 1),
        prices,
        resolution.category(),
    ))
}

/// Everything one configuration load produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    currencies: Vec<Currency>,
    categories: Vec<String>,
    offers: Vec<Offer>,
}

impl Catalog {
    /// Parses the three configuration lists.
    pub fn parse(
        currencies: &[impl AsRef<str>],
        categories: &[impl AsRef<str>],
        offers: &[impl AsRef<str>],
        registry: &dyn ItemRegistry,
    ) -> Self {
        let currencies = parse_currencies(currencies, registry);
        let categories = parse_categories(categories);

        let mut parsed = Vec::with_capacity(offers.len());
        for raw in offers {
            match parse_offer(raw.as_ref(), &categories, &currencies, registry) {
                OfferEntry::Accepted(offer) => parsed.push(offer),
                OfferEntry::Dropped { raw, reason } => {
                    tracing::warn!(offer = raw.as_str(), %reason, "dropping shop offer");
                }
            }
        }

        tracing::info!(
            currencies = currencies.len(),
            categories = categories.len(),
            offers = parsed.len(),
            dropped = offers.len() - parsed.len(),
            "shop catalog loaded"
        );

        Self {
            currencies,
            categories,
            offers: parsed,
        }
    }

    /// Parses a loaded [`ShopConfig`].
    pub fn from_config(config: &ShopConfig, registry: &dyn ItemRegistry) -> Self {
        Self::parse(&config.currencies, &config.categories, &config.offers, registry)
    }

    /// Currencies in configuration order. Never empty.
    #[must_use]
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// Categories in display order. Never empty.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Offers in configuration order.
    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Offer at `index`.
    #[must_use]
    pub fn offer(&self, index: usize) -> Option<&Offer> {
        self.offers.get(index)
    }

    /// Looks up a currency by id.
    #[must_use]
    pub fn currency(&self, id: &str) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.id.as_str() == id)
    }

    /// First configured currency. Legacy single-currency ledgers belong to it.
    #[must_use]
    pub fn primary_currency(&self) -> &Currency {
        // parse_currencies never returns an empty list
        &self.currencies[0]
    }

    /// Number of insertion slots, one per currency.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.currencies.len().max(1)
    }

    /// Currency accepted through insertion slot `slot`.
    #[must_use]
    pub fn currency_for_slot(&self, slot: usize) -> Option<&Currency> {
        self.currencies.get(slot)
    }

    /// Offers in `category`, with their catalog indices.
    pub fn offers_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Offer)> + 'a {
        self.offers
            .iter()
            .enumerate()
            .filter(move |(_, offer)| offer.category() == category)
    }

    /// Per-unit prices of every offer, index-aligned with [`Self::offers`].
    #[must_use]
    pub fn prices(&self) -> Vec<AggregatedPrice> {
        self.offers.iter().map(|o| o.price().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticRegistry;

    fn registry() -> StaticRegistry {
        StaticRegistry::with_items([
            "gold", "gem", "apple", "bread", "sword", "minecraft:emerald", "dirt",
        ])
    }

    fn currencies(registry: &StaticRegistry) -> Vec<Currency> {
        parse_currencies(&["gold", "gem"], registry)
    }

    #[test]
    fn test_scenario_single_offer() {
        let registry = registry();
        let catalog = Catalog::parse(&["gold"], &["food"], &["apple|gold=2"], &registry);

        assert_eq!(catalog.offers().len(), 1);
        let offer = &catalog.offers()[0];
        assert_eq!(offer.item().item.name, "apple");
        assert_eq!(offer.item().count, 1);
        assert_eq!(offer.price().get("gold"), 2);
        // two-token form has no category
        assert_eq!(offer.category(), "food");
    }

    #[test]
    fn test_multi_currency_offer() {
        let registry = registry();
        let catalog = Catalog::parse(
            &["gold", "gem"],
            &["food"],
            &["sword|food|gold=3,gem=1"],
            &registry,
        );
        let price = catalog.offers()[0].price();
        assert_eq!(price.get("gold"), 3);
        assert_eq!(price.get("gem"), 1);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let registry = registry();
        let catalog = Catalog::parse(&["gold"], &["cat1"], &["bread|cat9|gold=1"], &registry);
        assert_eq!(catalog.offers().len(), 1);
        assert_eq!(catalog.offers()[0].category(), "cat1");
    }

    #[test]
    fn test_resolve_category_cases() {
        let categories = vec!["cat1".to_string(), "cat2".to_string()];
        assert_eq!(
            resolve_category(" cat2 ", &categories),
            CategoryResolution::Configured("cat2".to_string())
        );
        assert_eq!(
            resolve_category("cat9", &categories),
            CategoryResolution::Unrecognized {
                declared: "cat9".to_string(),
                fallback: "cat1".to_string(),
            }
        );
        assert_eq!(
            resolve_category("  ", &categories),
            CategoryResolution::Missing {
                fallback: "cat1".to_string()
            }
        );
        assert_eq!(resolve_category("x", &[]).category(), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_category_resolution_is_deterministic() {
        let categories = vec!["cat1".to_string()];
        let first = resolve_category("cat9", &categories);
        for _ in 0..10 {
            assert_eq!(resolve_category("cat9", &categories), first);
        }
    }

    #[test]
    fn test_all_prices_malformed_drops_offer() {
        let registry = registry();
        let currencies = currencies(&registry);
        let entry = parse_offer(
            "apple|x|gold=abc,gem=-1,dirt=3,nothing",
            &["x".to_string()],
            &currencies,
            &registry,
        );
        assert_eq!(
            entry,
            OfferEntry::Dropped {
                raw: "apple|x|gold=abc,gem=-1,dirt=3,nothing".to_string(),
                reason: DropReason::NoValidPrices,
            }
        );
    }

    #[test]
    fn test_bad_token_is_not_fatal() {
        let registry = registry();
        let catalog = Catalog::parse(
            &["gold", "gem"],
            &["food"],
            &["apple|food|gold=0, gem = 4 ,unknown=2"],
            &registry,
        );
        let offer = &catalog.offers()[0];
        assert_eq!(offer.prices(), &[PriceRequirement::new("gem", 4)]);
    }

    #[test]
    fn test_price_token_issues() {
        let registry = registry();
        let currencies = currencies(&registry);
        let parse = |token: &str| parse_price_token(token, &currencies, &registry);

        assert_eq!(parse("  "), None);
        assert_eq!(parse("gold"), Some(Err(PriceIssue::Unrecognized("gold".to_string()))));
        assert_eq!(parse("ruby=1"), Some(Err(PriceIssue::UnknownCurrency("ruby".to_string()))));
        assert_eq!(
            parse("dirt=1"),
            Some(Err(PriceIssue::UnconfiguredCurrency("dirt".to_string())))
        );
        assert_eq!(parse("gold=1.5"), Some(Err(PriceIssue::InvalidPrice("1.5".to_string()))));
        assert_eq!(
            parse("gold=99999999999"),
            Some(Err(PriceIssue::InvalidPrice("99999999999".to_string())))
        );
        assert_eq!(parse("gold=0"), Some(Err(PriceIssue::NonPositive(0))));
        assert_eq!(parse("gold=-4"), Some(Err(PriceIssue::NonPositive(-4))));
        assert_eq!(parse("gold=7"), Some(Ok(PriceRequirement::new("gold", 7))));
    }

    #[test]
    fn test_unknown_item_drops_offer() {
        let registry = registry();
        let currencies = currencies(&registry);
        let entry = parse_offer("ruby|gold=1", &[], &currencies, &registry);
        assert!(matches!(
            entry,
            OfferEntry::Dropped { reason: DropReason::UnknownItem(_), .. }
        ));
    }

    #[test]
    fn test_missing_price_section_drops_offer() {
        let registry = registry();
        let currencies = currencies(&registry);
        let entry = parse_offer("apple", &[], &currencies, &registry);
        assert!(matches!(
            entry,
            OfferEntry::Dropped { reason: DropReason::MissingPriceSection, .. }
        ));
    }

    #[test]
    fn test_fallback_currency_injected() {
        let registry = registry();
        let catalog = Catalog::parse(&["ruby", "  "], &["food"], &["apple|food|ruby=1"], &registry);
        assert_eq!(catalog.currencies().len(), 1);
        assert_eq!(catalog.primary_currency().id.as_str(), FALLBACK_CURRENCY);
        assert_ne!(catalog.primary_currency().item.id, 0);
        assert!(catalog.offers().is_empty());
    }

    #[test]
    fn test_fallback_currency_without_registry_entry() {
        let registry = StaticRegistry::with_items(["apple"]);
        let empty: [&str; 0] = [];
        let catalog = Catalog::parse(&empty, &empty, &empty, &registry);
        assert_eq!(catalog.primary_currency().item, ItemHandle::unregistered(FALLBACK_CURRENCY));
        assert_eq!(catalog.categories(), &[FALLBACK_CATEGORY.to_string()]);
    }

    #[test]
    fn test_categories_trimmed_and_deduplicated() {
        assert_eq!(
            parse_categories(&[" a ", "", "b", "a"]),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(parse_categories(&["  "]), vec![FALLBACK_CATEGORY.to_string()]);
    }

    #[test]
    fn test_duplicate_currency_ignored() {
        let registry = registry();
        let currencies = parse_currencies(&["gold", "gold", "gem"], &registry);
        let ids: Vec<&str> = currencies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["gold", "gem"]);
    }

    #[test]
    fn test_order_and_idempotence() {
        let registry = registry();
        let offers = ["sword|b|gem=1", "apple|a|gold=1", "bread|a|gold=2"];
        let first = Catalog::parse(&["gold", "gem"], &["a", "b"], &offers, &registry);
        let second = Catalog::parse(&["gold", "gem"], &["a", "b"], &offers, &registry);
        assert_eq!(first, second);

        let names: Vec<&str> = first.offers().iter().map(|o| o.item().item.name.as_str()).collect();
        assert_eq!(names, vec!["sword", "apple", "bread"]);

        let in_a: Vec<usize> = first.offers_in_category("a").map(|(i, _)| i).collect();
        assert_eq!(in_a, vec![1, 2]);
    }

    #[test]
    fn test_slots_follow_currency_order() {
        let registry = registry();
        let catalog = Catalog::parse(&["gem", "gold"], &["a"], &["apple|gold=1"], &registry);
        assert_eq!(catalog.slot_count(), 2);
        assert_eq!(catalog.currency_for_slot(1).unwrap().id.as_str(), "gold");
        assert!(catalog.currency_for_slot(2).is_none());
    }

    #[test]
    fn test_from_default_config() {
        let registry = StaticRegistry::with_items([
            "minecraft:emerald",
            "minecraft:gold_ingot",
            "minecraft:apple",
            "minecraft:bread",
        ]);
        let catalog = Catalog::from_config(&ShopConfig::default(), &registry);
        assert_eq!(catalog.offers().len(), 2);
        assert_eq!(catalog.offers()[1].price().get("minecraft:gold_ingot"), 2);
    }
}
