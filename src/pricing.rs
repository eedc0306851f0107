//! Pricing Calculator
//!
//! Price tables are static configuration; the rules per category live in
//! `compute_quote` and nowhere else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::category::{classify_category, Category, SignImages};
use crate::formats::{size_key_for_format, FormatDims, SizeKey};

/// Immutable price tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    /// Size key -> unit price
    #[serde(default = "default_phenolic_prices")]
    pub phenolic_preset_prices: BTreeMap<String, f64>,
    #[serde(default = "default_set_price")]
    pub non_phenolic_set_price: f64,
    #[serde(default = "default_set_size")]
    pub set_size: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_phenolic_prices() -> BTreeMap<String, f64> {
    [
        ("1x3", 2.97),
        ("1.5x4.5", 6.75),
        ("2x6", 11.88),
        ("3x9", 26.73),
        ("4x12", 47.52),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_set_price() -> f64 { 49.75 }
fn default_set_size() -> u32 { 25 }
fn default_currency() -> String { "USD".to_string() }

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            phenolic_preset_prices: default_phenolic_prices(),
            non_phenolic_set_price: default_set_price(),
            set_size: default_set_size(),
            currency: default_currency(),
        }
    }
}

impl PricingTable {
    /// Raw phenolic unit price for a format, if its size is stocked.
    pub fn price_for_format(&self, dims: &FormatDims) -> Option<f64> {
        let key = size_key_for_format(dims)?;
        self.phenolic_preset_prices.get(key.as_str()).copied()
    }

    pub fn pack_size(&self) -> u32 {
        self.set_size.max(1)
    }
}

/// Raw phenolic unit price lookup against the default table.
pub fn price_for_format(dims: &FormatDims) -> Option<f64> {
    PricingTable::default().price_for_format(dims)
}

/// Round to cents, half away from zero.
pub fn round_currency(n: f64) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    (n * 100.0).round() / 100.0
}

/// Round a quantity up to the next whole pack; never less than one pack.
///
/// Saturates at the largest whole pack that fits in a `u64`.
pub fn normalize_packs(qty: i64, pack_size: u32) -> u64 {
    let pack = u64::from(pack_size.max(1));
    let qty = u64::try_from(qty).unwrap_or(0).max(1);
    qty.div_ceil(pack)
        .checked_mul(pack)
        .unwrap_or(u64::MAX - u64::MAX % pack)
}

/// Integer-prefix reading of a loosely typed quantity: `"30 tags"` is 30,
/// `12.9` is 12, anything unreadable is `None`.
pub fn parse_qty(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Requested quantity as the engine sees it: anything below 1 becomes 1.
pub fn coerce_qty(value: &Value) -> u64 {
    parse_qty(value).filter(|q| *q >= 1).unwrap_or(1) as u64
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

pub(crate) fn lenient_qty<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_qty).unwrap_or(0))
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(|s| match s.as_str() {
        "custom" => Category::Custom,
        "phenolic" => Category::Phenolic,
        "non_phenolic" => Category::NonPhenolic,
        _ => Category::Unknown,
    }))
}

/// Inputs of a quote. A pre-resolved `category` takes precedence over `sign_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    #[serde(default)]
    pub format: FormatDims,
    #[serde(default)]
    pub sign_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_qty")]
    pub qty: i64,
    #[serde(default)]
    pub sign_images: SignImages,
}

impl QuoteInput {
    pub fn resolved_category(&self) -> Category {
        self.category.unwrap_or_else(|| {
            classify_category(self.sign_type.as_deref().unwrap_or(""), &self.sign_images)
        })
    }

    pub fn requested_qty(&self) -> u64 {
        self.qty.max(1) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Breakdown {
    Unit {
        note: String,
        #[serde(rename = "unitPrice")]
        unit_price: f64,
    },
    Set {
        sets: u64,
        #[serde(rename = "setSize")]
        set_size: u32,
        #[serde(rename = "setPrice")]
        set_price: f64,
    },
}

/// A computed, never-mutated estimate.
///
/// `qty` and `effective_qty` both carry the quantity actually billed; for
/// pack-sold tags it may exceed `requested_qty`. Callers reflect
/// `effective_qty` back to the customer instead of rewriting their input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub category: Category,
    pub qty: u64,
    pub effective_qty: u64,
    pub requested_qty: u64,
    pub size_key: Option<SizeKey>,
    pub currency: String,
    pub unit_price: Option<f64>,
    pub estimated_total: Option<f64>,
    pub breakdown: Option<Breakdown>,
}

impl Quote {
    fn unpriced(category: Category, qty: u64, size_key: Option<SizeKey>, currency: &str) -> Self {
        Self {
            category,
            qty,
            effective_qty: qty,
            requested_qty: qty,
            size_key,
            currency: currency.to_string(),
            unit_price: None,
            estimated_total: None,
            breakdown: None,
        }
    }

    /// True when the quantity was rounded up to whole packs.
    pub fn qty_adjusted(&self) -> bool {
        self.qty != self.requested_qty
    }

    pub fn is_priced(&self) -> bool {
        self.estimated_total.is_some()
    }
}

pub fn compute_quote(input: &QuoteInput, pricing: &PricingTable) -> Quote {
    let category = input.resolved_category();
    let qty = input.requested_qty();
    let size_key = size_key_for_format(&input.format);
    let base = Quote::unpriced(category, qty, size_key, &pricing.currency);

    let quote = match category {
        Category::Phenolic => match pricing.price_for_format(&input.format) {
            Some(unit_price) => Quote {
                unit_price: Some(round_currency(unit_price)),
                estimated_total: Some(round_currency(unit_price * qty as f64)),
                breakdown: Some(Breakdown::Unit {
                    note: "phenolic preset".to_string(),
                    unit_price,
                }),
                ..base
            },
            None => base,
        },
        Category::NonPhenolic => {
            let set_size = pricing.pack_size();
            let packed = normalize_packs(qty as i64, set_size);
            let sets = packed.div_ceil(u64::from(set_size));
            let set_price = pricing.non_phenolic_set_price;
            Quote {
                qty: packed,
                effective_qty: packed,
                unit_price: Some(round_currency(set_price / f64::from(set_size))),
                estimated_total: Some(round_currency(sets as f64 * set_price)),
                breakdown: Some(Breakdown::Set {
                    sets,
                    set_size,
                    set_price,
                }),
                ..base
            }
        }
        // Custom designs need manual review; unknown items are never priced.
        Category::Custom | Category::Unknown => base,
    };

    tracing::debug!(
        category = %quote.category,
        qty = quote.qty,
        total = ?quote.estimated_total,
        "computed quote"
    );
    quote
}
