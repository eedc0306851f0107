//! Category classification from sign type and asset paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sign type selector for fully custom designs.
pub const CUSTOM_SIGN_TYPE: &str = "custom";

/// Asset path marker for pre-printed phenolic presets.
pub const PHENOLIC_ASSET_MARKER: &str = "assets/phenolic/";

/// Asset path marker for inventory-stocked tags.
pub const STOCK_TAG_MARKER: &str = "assets/tags/";

/// Sign type -> asset path.
pub type SignImages = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Custom,
    Phenolic,
    NonPhenolic,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Custom => "custom",
            Category::Phenolic => "phenolic",
            Category::NonPhenolic => "non_phenolic",
            Category::Unknown => "unknown",
        }
    }

    /// Stocked items, as opposed to designs needing manual review.
    pub fn is_stock(&self) -> bool {
        matches!(self, Category::Phenolic | Category::NonPhenolic)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_category(sign_type: &str, sign_images: &SignImages) -> Category {
    if sign_type == CUSTOM_SIGN_TYPE {
        return Category::Custom;
    }
    let path = sign_images.get(sign_type).map(String::as_str).unwrap_or("");
    if path.contains(PHENOLIC_ASSET_MARKER) {
        Category::Phenolic
    } else if path.contains(STOCK_TAG_MARKER) {
        Category::NonPhenolic
    } else {
        Category::Unknown
    }
}

/// Preview asset for a sign type, falling back to the stock tag naming convention.
pub fn preview_image_for(sign_type: &str, sign_images: &SignImages) -> String {
    if let Some(path) = sign_images.get(sign_type) {
        return path.clone();
    }
    let key = if sign_type.is_empty() {
        CUSTOM_SIGN_TYPE
    } else {
        sign_type
    };
    format!("{}3x5_{}.png", STOCK_TAG_MARKER, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> SignImages {
        let mut m = SignImages::new();
        m.insert("danger".into(), "assets/phenolic/Danger.jpg".into());
        m.insert("lockout".into(), "assets/tags/3x5_lockout.png".into());
        m.insert("odd".into(), "img/odd.png".into());
        m
    }

    #[test]
    fn test_custom_sentinel_wins() {
        let mut m = images();
        m.insert("custom".into(), "assets/phenolic/Custom.jpg".into());
        assert_eq!(classify_category("custom", &m), Category::Custom);
    }

    #[test]
    fn test_marker_classification() {
        let m = images();
        assert_eq!(classify_category("danger", &m), Category::Phenolic);
        assert_eq!(classify_category("lockout", &m), Category::NonPhenolic);
        assert_eq!(classify_category("odd", &m), Category::Unknown);
        assert_eq!(classify_category("missing", &m), Category::Unknown);
        assert_eq!(classify_category("", &m), Category::Unknown);
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::NonPhenolic).unwrap(),
            "\"non_phenolic\""
        );
    }

    #[test]
    fn test_preview_image_fallback() {
        let m = images();
        assert_eq!(preview_image_for("danger", &m), "assets/phenolic/Danger.jpg");
        assert_eq!(preview_image_for("notice", &m), "assets/tags/3x5_notice.png");
        assert_eq!(preview_image_for("", &m), "assets/tags/3x5_custom.png");
    }
}
