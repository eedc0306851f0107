//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};

use crate::config::TagConfig;
use crate::category::Category;
use crate::formats::Format;
use crate::layout::{FontSpec, LineLayout, TextMeasurer, TARGET_WIDTH_RATIO};
use crate::pricing::Quote;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub format_id: String,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Errors make the configuration invalid
    #[default]
    Block,
    /// Record everything, never invalidate
    Warn,
}

/// Everything a rule may look at.
pub struct ValidationContext<'a> {
    pub config: &'a TagConfig,
    pub format: &'a Format,
    pub quote: &'a Quote,
    pub layout: &'a [LineLayout],
    pub measurer: &'a dyn TextMeasurer,
}

pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct DimensionsRule;

impl ValidationRule for DimensionsRule {
    fn name(&self) -> &'static str { "dimensions" }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation> {
        match ctx.format.validate_dimensions() {
            Ok(()) => vec![],
            Err(e) => vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: e.to_string(),
                expected: Some("positive finite width and height".to_string()),
                actual: Some(format!("{} x {}", ctx.format.w, ctx.format.h)),
                remediation: vec!["Fix the format definition in the catalog".to_string()],
            }],
        }
    }
}

/// Warns when a laid-out line is still wider than the text area at its final size.
pub struct TextFitRule;

impl ValidationRule for TextFitRule {
    fn name(&self) -> &'static str { "text_fit" }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation> {
        let limit = ctx.format.view_box.width * TARGET_WIDTH_RATIO;
        ctx.layout
            .iter()
            .filter_map(|line| {
                let font = FontSpec {
                    family: line.font_family.clone(),
                    weight: line.font_weight,
                };
                let width = ctx.measurer.measure(&line.text, &font, line.font_size);
                (width > limit).then(|| ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Warning,
                    message: format!("'{}' overflows the tag at the minimum font size", line.text),
                    expected: Some(format!("{:.1} wide or less", limit)),
                    actual: Some(format!("{:.1}", width)),
                    remediation: vec!["Shorten the text or choose a larger format".to_string()],
                })
            })
            .collect()
    }
}

pub struct PackQuantityRule;

impl ValidationRule for PackQuantityRule {
    fn name(&self) -> &'static str { "pack_quantity" }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation> {
        if !ctx.quote.qty_adjusted() {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Info,
            message: "Quantity rounded up to whole packs".to_string(),
            expected: Some(format!("{}", ctx.quote.qty)),
            actual: Some(format!("{}", ctx.quote.requested_qty)),
            remediation: vec![],
        }]
    }
}

pub struct PriceAvailabilityRule;

impl ValidationRule for PriceAvailabilityRule {
    fn name(&self) -> &'static str { "price_availability" }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation> {
        if ctx.quote.is_priced() {
            return vec![];
        }
        let (severity, message) = match ctx.quote.category {
            Category::Custom => (ViolationSeverity::Info, "Custom designs are quoted after review"),
            Category::Phenolic => (ViolationSeverity::Warning, "No preset price for this size"),
            _ => (ViolationSeverity::Warning, "Sign type has no price category"),
        };
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity,
            message: message.to_string(),
            expected: None,
            actual: ctx.quote.size_key.as_ref().map(|k| k.to_string()),
            remediation: vec!["Submit the configuration for a manual quote".to_string()],
        }]
    }
}

/// Rejects hole/adhesive/thickness choices outside the production range.
pub struct ProductionRule;

impl ValidationRule for ProductionRule {
    fn name(&self) -> &'static str { "production" }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationViolation> {
        match ctx.config.production_spec() {
            Ok(_) => vec![],
            Err(e) => vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: e.to_string(),
                expected: None,
                actual: Some(ctx.config.thickness.clone()),
                remediation: vec!["Choose a supported thickness".to_string()],
            }],
        }
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule + Send + Sync>>,
    failure_mode: FailureMode,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(DimensionsRule),
                Box::new(ProductionRule),
                Box::new(TextFitRule),
                Box::new(PackQuantityRule),
                Box::new(PriceAvailabilityRule),
            ],
            failure_mode: FailureMode::Block,
        }
    }

    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    pub fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let violations: Vec<_> = self.rules.iter().flat_map(|r| r.validate(ctx)).collect();
        let has_errors = violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        let valid = match self.failure_mode {
            FailureMode::Block => !has_errors,
            FailureMode::Warn => true,
        };
        ValidationResult {
            valid,
            violations,
            format_id: ctx.format.id.clone(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
