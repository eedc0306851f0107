//! Configurator - Single Entry Point
//!
//! `configure` always validates before producing a payload. A configuration that
//! fails validation never yields an order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::category::{classify_category, preview_image_for, Category};
use crate::config::TagConfig;
use crate::error::{QuoteError, Result};
use crate::formats::{Format, HoleType};
use crate::hashing::compute_payload_fingerprint;
use crate::layout::{layout_tag_with, HeuristicMeasurer, LayoutOptions, LineLayout, TextCase, TextMeasurer};
use crate::orders::{NewOrder, OrderKind};
use crate::pricing::{compute_quote, Quote, QuoteInput};
use crate::production::Adhesive;
use crate::validation::{FailureMode, ValidationContext, ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    pub line1: String,
    pub line2: String,
    pub font: String,
    pub case: TextCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOptions {
    pub top: String,
    pub core: String,
    /// Resolved text color; `auto` is already replaced by the core color
    pub text: String,
    pub outline: String,
    /// Colors follow the sign type preset and are not customer choices
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureOptions {
    pub hole: HoleType,
    pub adhesive: Adhesive,
    pub thickness_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadOptions {
    pub text: TextOptions,
    pub colors: ColorOptions,
    pub features: FeatureOptions,
    pub sign_type: String,
}

/// The quote request sent along with an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotePayload {
    pub format: Format,
    pub options: PayloadOptions,
    pub quantity: u64,
    pub estimate_total: Option<f64>,
    pub preview_image: String,
}

impl QuotePayload {
    /// Human-readable request summary, one fact per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let text = &self.options.text;
        let colors = &self.options.colors;
        let features = &self.options.features;
        let mut lines = vec![
            format!("Format: {} [{}]", self.format.label, self.format.id),
            format!("Qty: {}", self.quantity),
            format!("Sign Type: {}", self.options.sign_type),
            format!("Preview Image: {}", self.preview_image),
        ];
        if text.line2.is_empty() {
            lines.push(format!("Text: \"{}\"", text.line1));
        } else {
            lines.push(format!("Text: \"{}\" / \"{}\"", text.line1, text.line2));
        }
        lines.push(format!("Font: {} | Case: {:?}", text.font, text.case));
        lines.push(format!(
            "Colors: Top {}, Core {}, Text {}, Outline {}{}",
            colors.top,
            colors.core,
            colors.text,
            colors.outline,
            if colors.locked { " (preset)" } else { "" }
        ));
        lines.push(format!(
            "Features: Hole {}, Adhesive {}, Thick {}mm",
            features.hole, features.adhesive, features.thickness_mm
        ));
        lines.push(match self.estimate_total {
            Some(total) => format!("Estimate (non-binding): ${:.2}", total),
            None => "Estimate: quoted after review".to_string(),
        });
        lines
    }
}

/// Result of configuring one tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredTag {
    pub quote: Quote,
    pub layout: Vec<LineLayout>,
    pub validation: ValidationResult,
    pub payload: QuotePayload,
    pub fingerprint: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
}

impl ConfiguredTag {
    pub fn summary(&self) -> String {
        self.payload.summary_lines().join("\n")
    }

    /// Submission for the order history.
    pub fn to_new_order(&self) -> Result<NewOrder> {
        let kind = if self.quote.category.is_stock() {
            OrderKind::Stock
        } else {
            OrderKind::Custom
        };
        Ok(NewOrder {
            id: None,
            kind: Some(kind),
            title: Some(self.payload.format.label.clone()),
            qty: Some(self.quote.effective_qty.into()),
            total: self.quote.estimated_total,
            summary: Some(self.summary()),
            config: Some(serde_json::to_value(&self.payload)?),
        })
    }
}

/// The configurator - single entry point for turning a configuration into a quote.
pub struct Configurator {
    catalog: Catalog,
    validator: Validator,
    measurer: Box<dyn TextMeasurer + Send + Sync>,
}

impl Configurator {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            validator: Validator::new(),
            measurer: Box::new(HeuristicMeasurer::default()),
        }
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasurer + Send + Sync + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.validator = Validator::new().with_failure_mode(failure_mode);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list_formats(&self) -> &[Format] {
        self.catalog.list_formats()
    }

    pub fn classify(&self, sign_type: &str) -> Category {
        classify_category(sign_type, &self.catalog.sign_images)
    }

    /// Point `config` at catalog format `id`, resetting the hole to the format's default.
    pub fn select_format(&self, config: &mut TagConfig, id: &str) -> Result<()> {
        let format = self.resolve_format(id)?;
        config.select_format(format);
        Ok(())
    }

    pub fn quote(&self, config: &TagConfig) -> Result<Quote> {
        let format = self.resolve_format(&config.format_id)?;
        Ok(compute_quote(&self.quote_input(config, format), &self.catalog.pricing))
    }

    pub fn layout(&self, config: &TagConfig) -> Result<Vec<LineLayout>> {
        let format = self.resolve_format(&config.format_id)?;
        Ok(self.layout_for(config, format))
    }

    /// Quote, lay out, validate and package a configuration.
    ///
    /// Validation always runs; a blocking violation is an error.
    pub fn configure(&self, config: &TagConfig) -> Result<ConfiguredTag> {
        self.catalog.check_engine_version()?;
        let format = self.resolve_format(&config.format_id)?;

        let quote = compute_quote(&self.quote_input(config, format), &self.catalog.pricing);
        let layout = self.layout_for(config, format);

        let validation = self.validator.validate(&ValidationContext {
            config,
            format,
            quote: &quote,
            layout: &layout,
            measurer: self.measurer.as_ref(),
        });
        if !validation.valid {
            return Err(QuoteError::ValidationFailed(validation.messages().join("; ")));
        }

        let payload = self.build_payload(config, format, &quote);
        let fingerprint = compute_payload_fingerprint(
            &format.id,
            &self.catalog.catalog_version,
            &payload,
            ENGINE_VERSION,
        )?;

        tracing::debug!(format = %format.id, fingerprint = %fingerprint, "configured tag");

        Ok(ConfiguredTag {
            quote,
            layout,
            validation,
            payload,
            fingerprint,
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
        })
    }

    fn resolve_format(&self, id: &str) -> Result<&Format> {
        self.catalog
            .format(id)
            .ok_or_else(|| QuoteError::FormatNotFound(id.to_string()))
    }

    fn quote_input(&self, config: &TagConfig, format: &Format) -> QuoteInput {
        QuoteInput {
            format: format.dims(),
            sign_type: Some(config.sign_type.clone()),
            category: None,
            qty: config.qty,
            sign_images: self.catalog.sign_images.clone(),
        }
    }

    fn layout_for(&self, config: &TagConfig, format: &Format) -> Vec<LineLayout> {
        let options = LayoutOptions {
            font_family: Some(config.font.clone()),
            ..LayoutOptions::new(format.view_box, config.cased_lines())
        };
        layout_tag_with(&options, self.measurer.as_ref())
    }

    fn build_payload(&self, config: &TagConfig, format: &Format, quote: &Quote) -> QuotePayload {
        let thickness_mm = config
            .production_spec()
            .map(|s| s.thickness_mm)
            .unwrap_or_default();
        QuotePayload {
            format: format.clone(),
            options: PayloadOptions {
                text: TextOptions {
                    line1: config.line1.clone(),
                    line2: config.line2.clone(),
                    font: config.font.clone(),
                    case: config.text_case,
                },
                colors: ColorOptions {
                    top: config.top_color.clone(),
                    core: config.core_color.clone(),
                    text: config.effective_text_color().to_string(),
                    outline: config.outline.clone(),
                    locked: config.colors_locked(),
                },
                features: FeatureOptions {
                    hole: config.hole,
                    adhesive: config.adhesive,
                    thickness_mm,
                },
                sign_type: config.sign_type.clone(),
            },
            quantity: quote.effective_qty,
            estimate_total: quote.estimated_total,
            preview_image: preview_image_for(&config.sign_type, &self.catalog.sign_images),
        }
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}
