//! # Economy Error Types
//!
//! All errors that can occur in the shop economy.
//!
//! Configuration problems inside a well-formed file never surface here: the
//! catalog parser drops the offending entry and logs a warning instead.

use thiserror::Error;

use crate::pricing::AggregatedPrice;

/// Errors that can occur in the shop economy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Purchase quantity must be at least one.
    #[error("invalid purchase quantity: {0}")]
    InvalidQuantity(u32),

    /// The offer carries no price entries.
    #[error("offer has no price")]
    UnpricedOffer,

    /// Scaling the price or the delivered stack by the quantity overflowed.
    #[error("purchase quantity overflows price or stack size")]
    QuantityOverflow,

    /// At least one required currency is short. The ledger was not touched.
    #[error("insufficient funds: need {required}")]
    InsufficientFunds {
        /// Total cost of the attempted purchase.
        required: AggregatedPrice,
    },

    /// No offer exists at this catalog index.
    #[error("offer not found: {0}")]
    OfferNotFound(usize),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read config {path}: {reason}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },
}

/// Result type for economy operations.
pub type ShopResult<T> = Result<T, ShopError>;
