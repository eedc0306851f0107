//! Production options
//!
//! Physical options of a tag and where each value came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QuoteError, Result};
use crate::formats::{Format, HoleType};

pub const MIN_THICKNESS_MM: f64 = 0.5;
pub const MAX_THICKNESS_MM: f64 = 6.4;

/// Where a set of production options came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    /// Engine defaults (fallback)
    #[default]
    System,
    /// Defaults carried by the selected format
    Format,
    /// User-provided values (validated)
    User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adhesive {
    #[default]
    None,
    Permanent,
    Removable,
}

impl fmt::Display for Adhesive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adhesive::None => write!(f, "none"),
            Adhesive::Permanent => write!(f, "permanent"),
            Adhesive::Removable => write!(f, "removable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSpec {
    pub source: OptionSource,
    pub hole: HoleType,
    pub adhesive: Adhesive,
    pub thickness_mm: f64,
}

impl Default for ProductionSpec {
    fn default() -> Self {
        Self {
            source: OptionSource::System,
            hole: HoleType::H0125,
            adhesive: Adhesive::None,
            thickness_mm: 1.6,
        }
    }
}

impl ProductionSpec {
    /// Defaults for a freshly selected format.
    pub fn from_format(format: &Format) -> Self {
        Self {
            source: OptionSource::Format,
            hole: format.hole.unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Create from user values with validation. Thickness is given as entered, in mm.
    pub fn from_user(hole: HoleType, adhesive: Adhesive, thickness: &str) -> Result<Self> {
        let thickness_mm: f64 =
            thickness
                .trim()
                .parse()
                .map_err(|_| QuoteError::InvalidProductionOption {
                    field: "thickness".to_string(),
                    message: format!("'{}' is not a number", thickness),
                })?;
        if !(MIN_THICKNESS_MM..=MAX_THICKNESS_MM).contains(&thickness_mm) {
            return Err(QuoteError::InvalidProductionOption {
                field: "thickness".to_string(),
                message: format!(
                    "must be between {} and {} mm",
                    MIN_THICKNESS_MM, MAX_THICKNESS_MM
                ),
            });
        }
        Ok(Self {
            source: OptionSource::User,
            hole,
            adhesive,
            thickness_mm,
        })
    }
}
