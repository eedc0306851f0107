//! TagQuote Core - Safety Tag Quote Engine
//!
//! # Guarantees
//! 1. Quotes are pure: same input, same quote
//! 2. Custom designs are never priced
//! 3. Pack-sold tags are quoted in whole packs, and the caller is told
//! 4. Preview text always fits or clamps at the minimum size
//! 5. No order is submitted without being proofed, and submission is final

pub mod catalog;
pub mod category;
pub mod config;
pub mod error;
pub mod formats;
pub mod hashing;
pub mod layout;
pub mod orders;
pub mod pipeline;
pub mod pricing;
pub mod production;
pub mod validation;

pub use catalog::Catalog;
pub use category::{classify_category, Category, SignImages};
pub use config::{decode_share_token, encode_share_token, TagConfig};
pub use error::{QuoteError, Result};
pub use formats::{size_key_for_format, Format, FormatDims, SizeKey, ViewBox};
pub use hashing::{canonical_json, compute_payload_fingerprint};
pub use layout::{layout_tag, layout_tag_with, LayoutOptions, LineLayout, TextMeasurer};
pub use orders::{Order, OrderHistory, OrderStateMachine, OrderStatus, TransitionResult};
pub use pipeline::{ConfiguredTag, Configurator, QuotePayload};
pub use pricing::{compute_quote, normalize_packs, price_for_format, PricingTable, Quote, QuoteInput};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
