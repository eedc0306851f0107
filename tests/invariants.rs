//! Contract Invariant Tests
//!
//! These tests verify the pricing, layout and order guarantees end to end.

use pretty_assertions::assert_eq;
use std::fs;

use tagquote_core::{
    catalog::Catalog,
    category::Category,
    compute_quote,
    formats::HoleType,
    normalize_packs,
    layout::{layout_tag, layout_tag_with, AdvanceTableMeasurer, LayoutOptions, PLACEHOLDER_TEXT},
    orders::{Order, OrderHistory, OrderKind, OrderStateMachine, OrderStatus},
    pricing::PricingTable,
    Configurator, FormatDims, QuoteError, QuoteInput, SizeKey, TagConfig, ViewBox,
};

fn quote(category: Category, dims: FormatDims, qty: i64) -> tagquote_core::Quote {
    compute_quote(
        &QuoteInput {
            format: dims,
            category: Some(category),
            qty,
            ..Default::default()
        },
        &PricingTable::default(),
    )
}

#[test]
fn invariant_size_key_order_independent() {
    let samples = [(1.0, 3.0), (1.5, 4.5), (2.25, 7.125), (0.333, 12.0), (5.0, 5.0)];
    for (w, h) in samples {
        assert_eq!(SizeKey::from_dimensions(w, h), SizeKey::from_dimensions(h, w));
    }
}

#[test]
fn invariant_custom_never_priced() {
    for qty in [-3, 0, 1, 25, 1000] {
        for dims in [FormatDims::new(2.0, 6.0), FormatDims::new(5.0, 3.0), FormatDims::default()] {
            let q = quote(Category::Custom, dims, qty);
            assert!(q.estimated_total.is_none());
            assert!(q.unit_price.is_none());
        }
    }
}

#[test]
fn invariant_phenolic_2x6_qty_4() {
    let q = quote(Category::Phenolic, FormatDims::new(6.0, 2.0), 4);
    assert_eq!(q.unit_price, Some(11.88));
    assert_eq!(q.estimated_total, Some(47.52));
    assert_eq!(q.currency, "USD");
}

#[test]
fn invariant_phenolic_price_table() {
    let expected = [
        ((1.0, 3.0), 2.97),
        ((1.5, 4.5), 6.75),
        ((2.0, 6.0), 11.88),
        ((3.0, 9.0), 26.73),
        ((4.0, 12.0), 47.52),
    ];
    for ((w, h), price) in expected {
        let q = quote(Category::Phenolic, FormatDims::new(w, h), 1);
        assert_eq!(q.unit_price, Some(price));
        assert_eq!(q.estimated_total, Some(price));
    }
}

#[test]
fn invariant_non_phenolic_packs() {
    let q = quote(Category::NonPhenolic, FormatDims::default(), 30);
    assert_eq!(q.qty, 50);
    assert_eq!(q.estimated_total, Some(99.5));

    assert_eq!(normalize_packs(1, 25), 25);
    assert_eq!(normalize_packs(26, 25), 50);
    assert_eq!(normalize_packs(0, 25), 25);
}

#[test]
fn invariant_non_phenolic_requote_is_idempotent() {
    for qty in [1, 24, 25, 26, 49, 51, 99, 130] {
        let first = quote(Category::NonPhenolic, FormatDims::default(), qty);
        let second = quote(Category::NonPhenolic, FormatDims::default(), first.qty as i64);
        assert_eq!(first.qty, second.qty);
        assert_eq!(first.estimated_total, second.estimated_total);
        assert!(!second.qty_adjusted());
    }
}

#[test]
fn invariant_money_has_cent_precision() {
    for qty in 1..200 {
        for category in [Category::Phenolic, Category::NonPhenolic] {
            let q = quote(category, FormatDims::new(1.5, 4.5), qty);
            for amount in [q.unit_price, q.estimated_total].into_iter().flatten() {
                assert!(((amount * 100.0).round() - amount * 100.0).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn invariant_layout_font_size_within_bounds() {
    let long = "M".repeat(300);
    let texts = ["", "A", "PUMP 12", "480V", "EMERGENCY STOP - DO NOT OPERATE", long.as_str()];
    for text in texts {
        let mut options = LayoutOptions::new(ViewBox::new(0.0, 0.0, 500.0, 300.0), vec![text.to_string()]);
        options.min_size = Some(12.0);
        options.max_size = Some(80.0);
        for line in layout_tag(&options) {
            assert!(line.font_size >= 12.0 && line.font_size <= 80.0, "{}", line.font_size);
        }
        for line in layout_tag_with(&options, &AdvanceTableMeasurer::default()) {
            assert!(line.font_size >= 12.0 && line.font_size <= 80.0, "{}", line.font_size);
        }
    }
}

#[test]
fn invariant_layout_monotonic_in_width() {
    let mut previous = 0.0;
    for width in [200.0, 300.0, 400.0, 500.0, 600.0] {
        let mut options = LayoutOptions::new(
            ViewBox::new(0.0, 0.0, width, 300.0),
            vec!["HIGH VOLTAGE PANEL".to_string()],
        );
        options.max_size = Some(200.0);
        let size = layout_tag(&options)[0].font_size;
        assert!(size > previous, "{} at width {}", size, width);
        previous = size;
    }
}

#[test]
fn invariant_layout_placeholder() {
    let out = layout_tag(&LayoutOptions::default());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, PLACEHOLDER_TEXT);
}

#[test]
fn invariant_order_transitions() {
    assert!(!OrderStateMachine::transition("draft", "submitted").ok);
    assert!(OrderStateMachine::transition("draft", "proofed").ok);
    assert!(!OrderStateMachine::transition("submitted", "draft").ok);
}

#[test]
fn invariant_configure_to_order_flow() {
    let configurator = Configurator::default();
    let config = TagConfig {
        format_id: "phenolic-2x6".into(),
        sign_type: "danger".into(),
        qty: 4,
        ..Default::default()
    };
    let tag = configurator.configure(&config).unwrap();
    assert_eq!(tag.quote.category, Category::Phenolic);
    assert_eq!(tag.payload.estimate_total, Some(47.52));
    assert_eq!(tag.payload.preview_image, "assets/phenolic/Danger.jpg");
    assert!(tag.summary().contains("Estimate (non-binding): $47.52"));

    // Same configuration, same fingerprint
    let again = configurator.configure(&config).unwrap();
    assert_eq!(tag.fingerprint, again.fingerprint);

    let mut history = OrderHistory::new();
    let order = history.record(Order::from_submission(tag.to_new_order().unwrap())).clone();
    assert_eq!(order.kind, OrderKind::Stock);
    assert_eq!(order.qty, 4);
    assert_eq!(order.total, Some(47.52));
    assert_eq!(order.status, OrderStatus::Draft);

    assert!(history.advance(&order.id, OrderStatus::Submitted).is_err());
    history.advance(&order.id, OrderStatus::Proofed).unwrap();
    history.advance(&order.id, OrderStatus::Submitted).unwrap();
    assert_eq!(history.get(&order.id).unwrap().status, OrderStatus::Submitted);
}

#[test]
fn invariant_huge_quantity_configures_without_panicking() {
    let config: TagConfig = serde_json::from_value(serde_json::json!({
        "formatId": "phenolic-1x3",
        "signType": "lockout",
        "qty": 1e30
    }))
    .unwrap();
    let mut catalog = Catalog::builtin();
    catalog
        .sign_images
        .insert("lockout".into(), "assets/tags/3x5_lockout.png".into());
    let tag = Configurator::new(catalog).configure(&config).unwrap();
    assert_eq!(tag.quote.category, Category::NonPhenolic);
    assert_eq!(tag.payload.quantity % 25, 0);
    assert_eq!(tag.payload.quantity, tag.quote.effective_qty);
}

#[test]
fn invariant_payload_carries_resolved_colors() {
    let configurator = Configurator::default();
    let mut config = TagConfig {
        outline: "black".into(),
        ..Default::default()
    };
    configurator.select_format(&mut config, "phenolic-2x6").unwrap();
    assert_eq!(config.hole, HoleType::None);
    assert!(configurator.select_format(&mut config, "nonexistent").is_err());
    assert_eq!(config.format_id, "phenolic-2x6");

    let tag = configurator.configure(&config).unwrap();
    let colors = &tag.payload.options.colors;
    assert_eq!(colors.text, "#000000");
    assert_eq!(colors.outline, "black");
    assert!(!colors.locked);
    assert!(tag.summary().contains("Outline black"));

    config.sign_type = "danger".into();
    let tag = configurator.configure(&config).unwrap();
    assert!(tag.payload.options.colors.locked);
    assert!(tag.summary().contains("(preset)"));
}

#[test]
fn invariant_custom_configuration_is_unpriced() {
    let tag = Configurator::default().configure(&TagConfig::default()).unwrap();
    assert_eq!(tag.quote.category, Category::Custom);
    assert!(tag.payload.estimate_total.is_none());
    assert_eq!(tag.to_new_order().unwrap().kind, Some(OrderKind::Custom));
    assert_eq!(tag.layout.len(), 2);
}

#[test]
fn invariant_unknown_format_rejected() {
    let config = TagConfig {
        format_id: "nonexistent".into(),
        ..Default::default()
    };
    let err = Configurator::default().configure(&config).unwrap_err();
    assert!(matches!(err, QuoteError::FormatNotFound(_)));
    assert!(err.to_string().contains("Format not found"));
}

#[test]
fn invariant_invalid_configuration_blocked() {
    let config = TagConfig {
        thickness: "0.1".into(),
        ..Default::default()
    };
    let err = Configurator::default().configure(&config).unwrap_err();
    assert!(err.to_string().contains("Validation failed"));
}

#[test]
fn invariant_catalog_dir_merges_and_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a_formats.json"),
        r#"{
            "formats": [
                {"id": "tag-1x3", "label": "Stock tag", "shape": "rect", "width": 3, "height": 1, "viewBox": [0, 0, 600, 200]}
            ],
            "signImages": {"lockout": "assets/tags/3x5_lockout.png"}
        }"#,
    )
    .unwrap();
    fs::write(dir.path().join("b_broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let catalog = Catalog::load(dir.path()).unwrap();
    assert_eq!(catalog.list_formats().len(), 1);
    assert_eq!(catalog.pricing, PricingTable::default());

    let configurator = Configurator::new(catalog);
    let tag = configurator
        .configure(&TagConfig {
            format_id: "tag-1x3".into(),
            sign_type: "lockout".into(),
            qty: 30,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(tag.quote.category, Category::NonPhenolic);
    assert_eq!(tag.payload.quantity, 50);
    assert_eq!(tag.payload.estimate_total, Some(99.5));
}

#[test]
fn invariant_missing_catalog_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, QuoteError::CatalogNotFound { .. }));
}
