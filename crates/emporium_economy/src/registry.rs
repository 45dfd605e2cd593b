//! # Item Registry
//!
//! The host owns the list of tradeable items. The economy only asks it one
//! question: does this identifier name a known item, and if so which one.

use std::collections::HashMap;

/// Numeric item identifier assigned by the registry.
pub type ItemId = u32;

/// Id used for handles that do not come from a registry.
pub const UNREGISTERED_ITEM_ID: ItemId = 0;

/// Stack size assumed for unregistered items.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A resolved item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemHandle {
    /// Registry id, or [`UNREGISTERED_ITEM_ID`].
    pub id: ItemId,
    /// Canonical identifier, e.g. `minecraft:emerald`.
    pub name: String,
    /// Maximum stack size for this item type.
    pub max_stack: u32,
}

impl ItemHandle {
    /// Creates a handle that no registry vouched for.
    #[must_use]
    pub fn unregistered(name: impl Into<String>) -> Self {
        Self {
            id: UNREGISTERED_ITEM_ID,
            name: name.into(),
            max_stack: DEFAULT_MAX_STACK,
        }
    }
}

/// A stack of one item type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// The item type.
    pub item: ItemHandle,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item: ItemHandle, count: u32) -> Self {
        Self { item, count }
    }

    /// Returns true if the stack holds nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if both stacks hold the same item type.
    #[inline]
    #[must_use]
    pub fn is_same_item(&self, other: &ItemHandle) -> bool {
        self.item.name == other.name
    }

    /// Splits this stack into pieces no larger than the item's max stack size.
    #[must_use]
    pub fn split_by_max_stack(&self) -> Vec<ItemStack> {
        let max = self.item.max_stack.max(1);
        let mut remaining = self.count;
        let mut pieces = Vec::with_capacity((remaining / max) as usize + 1);
        while remaining > 0 {
            let take = remaining.min(max);
            pieces.push(ItemStack::new(self.item.clone(), take));
            remaining -= take;
        }
        pieces
    }
}

/// The registry oracle.
///
/// Must answer synchronously; the catalog parser calls it for every currency,
/// offer item and price token.
pub trait ItemRegistry {
    /// Resolves an identifier to an item, or `None` if it is not tradeable.
    fn resolve(&self, name: &str) -> Option<ItemHandle>;
}

/// A fixed, in-memory registry.
#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
    items: HashMap<String, ItemHandle>,
    next_id: ItemId,
}

impl StaticRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `names`, each with the default stack size.
    #[must_use]
    pub fn with_items<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name.as_ref(), DEFAULT_MAX_STACK);
        }
        registry
    }

    /// Registers an item, returning its handle. Re-registering a name
    /// updates its stack size and keeps its id.
    pub fn register(&mut self, name: &str, max_stack: u32) -> ItemHandle {
        if let Some(existing) = self.items.get_mut(name) {
            existing.max_stack = max_stack;
            return existing.clone();
        }
        self.next_id += 1;
        let handle = ItemHandle {
            id: self.next_id,
            name: name.to_string(),
            max_stack,
        };
        self.items.insert(name.to_string(), handle.clone());
        handle
    }

    /// Returns the number of registered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Option<ItemHandle> {
        self.items.get(name).cloned()
    }
}
