//! Format descriptors and orientation-independent size keys.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{QuoteError, Result};

/// Tolerance under which a rounded dimension is rendered as an integer.
pub const INTEGER_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Rect,
    Circle,
}

/// Mounting hole options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HoleType {
    #[default]
    None,
    /// 1/8" hole, left edge
    H0125,
    /// 3/16" hole, right edge
    H0187,
}

impl fmt::Display for HoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoleType::None => write!(f, "none"),
            HoleType::H0125 => write!(f, "h0125"),
            HoleType::H0187 => write!(f, "h0187"),
        }
    }
}

/// Rendering box of a format, in preview units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ViewBoxRepr")]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::new(0.0, 0.0, 500.0, 300.0)
    }
}

// Catalogs write view boxes either as `[x, y, w, h]` or as an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ViewBoxRepr {
    Array([f64; 4]),
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        width: f64,
        height: f64,
    },
}

impl From<ViewBoxRepr> for ViewBox {
    fn from(repr: ViewBoxRepr) -> Self {
        match repr {
            ViewBoxRepr::Array([x, y, width, height]) => ViewBox::new(x, y, width, height),
            ViewBoxRepr::Object { x, y, width, height } => ViewBox::new(x, y, width, height),
        }
    }
}

/// An immutable product format. Dimensions are in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(alias = "width")]
    pub w: f64,
    #[serde(alias = "height")]
    pub h: f64,
    #[serde(default)]
    pub view_box: ViewBox,
    #[serde(default)]
    pub hole: Option<HoleType>,
}

impl Format {
    /// Enforce the positive-finite dimension invariant.
    pub fn validate_dimensions(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.w) && ok(self.h) {
            Ok(())
        } else {
            Err(QuoteError::InvalidDimensions {
                id: self.id.clone(),
                width: self.w,
                height: self.h,
            })
        }
    }

    pub fn dims(&self) -> FormatDims {
        FormatDims {
            w: Some(self.w),
            h: Some(self.h),
        }
    }

    pub fn size_key(&self) -> Option<SizeKey> {
        SizeKey::from_dimensions(self.w, self.h)
    }
}

/// Lenient dimension view of a format, as accepted at the quote boundary.
///
/// Either `w`/`h` or `width`/`height` naming is accepted, and numeric strings are
/// read as numbers. Anything else leaves the dimension unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDims {
    #[serde(default, alias = "width", deserialize_with = "lenient_f64")]
    pub w: Option<f64>,
    #[serde(default, alias = "height", deserialize_with = "lenient_f64")]
    pub h: Option<f64>,
}

impl FormatDims {
    pub fn new(w: f64, h: f64) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
        }
    }
}

impl From<&Format> for FormatDims {
    fn from(format: &Format) -> Self {
        format.dims()
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Canonical `"<small>x<large>"` key used for price lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeKey(String);

impl SizeKey {
    /// Returns `None` when either dimension is not finite.
    pub fn from_dimensions(w: f64, h: f64) -> Option<Self> {
        if !w.is_finite() || !h.is_finite() {
            return None;
        }
        let small = w.min(h);
        let large = w.max(h);
        Some(SizeKey(format!(
            "{}x{}",
            format_dimension(small),
            format_dimension(large)
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SizeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn size_key_for_format(dims: &FormatDims) -> Option<SizeKey> {
    SizeKey::from_dimensions(dims.w?, dims.h?)
}

fn format_dimension(n: f64) -> String {
    let rounded = (n * 100.0).round() / 100.0;
    if (rounded - rounded.round()).abs() < INTEGER_TOLERANCE {
        // + 0.0 turns -0 into 0
        format!("{}", rounded.round() + 0.0)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_key_order_independent() {
        assert_eq!(
            SizeKey::from_dimensions(3.0, 9.0),
            SizeKey::from_dimensions(9.0, 3.0)
        );
        assert_eq!(SizeKey::from_dimensions(9.0, 3.0).unwrap().as_str(), "3x9");
    }

    #[test]
    fn test_size_key_decimal_rendering() {
        let key = SizeKey::from_dimensions(4.5, 1.5).unwrap();
        assert_eq!(key.as_str(), "1.5x4.5");

        // 2.999 rounds to 3.00 and renders as an integer
        let key = SizeKey::from_dimensions(2.999, 9.001).unwrap();
        assert_eq!(key.as_str(), "3x9");

        let key = SizeKey::from_dimensions(1.234, 5.0).unwrap();
        assert_eq!(key.as_str(), "1.23x5");
    }

    #[test]
    fn test_size_key_large_and_signed_zero() {
        let key = SizeKey::from_dimensions(1e20, 3.0).unwrap();
        assert_eq!(key.as_str(), "3x100000000000000000000");
        let key = SizeKey::from_dimensions(-0.001, 3.0).unwrap();
        assert_eq!(key.as_str(), "0x3");
    }

    #[test]
    fn test_size_key_non_finite() {
        assert!(SizeKey::from_dimensions(f64::NAN, 3.0).is_none());
        assert!(SizeKey::from_dimensions(3.0, f64::INFINITY).is_none());
        assert!(size_key_for_format(&FormatDims { w: Some(2.0), h: None }).is_none());
    }

    #[test]
    fn test_dims_accept_both_namings() {
        let a: FormatDims = serde_json::from_str(r#"{"w": 2, "h": 6}"#).unwrap();
        let b: FormatDims = serde_json::from_str(r#"{"width": 6, "height": "2"}"#).unwrap();
        assert_eq!(size_key_for_format(&a), size_key_for_format(&b));

        let bad: FormatDims = serde_json::from_str(r#"{"w": "wide", "h": 2}"#).unwrap();
        assert!(size_key_for_format(&bad).is_none());
    }

    #[test]
    fn test_format_view_box_array() {
        let f: Format = serde_json::from_str(
            r#"{"id":"rect-5x3","label":"Rectangle","shape":"rect","w":5,"h":3,"viewBox":[0,0,500,300],"hole":"none"}"#,
        )
        .unwrap();
        assert_eq!(f.view_box, ViewBox::new(0.0, 0.0, 500.0, 300.0));
        assert_eq!(f.hole, Some(HoleType::None));
        assert_eq!(f.size_key().unwrap().as_str(), "3x5");
    }

    #[test]
    fn test_validate_dimensions() {
        let mut f = Format {
            id: "x".into(),
            label: "x".into(),
            shape: Shape::Rect,
            w: 2.0,
            h: 6.0,
            view_box: ViewBox::default(),
            hole: None,
        };
        assert!(f.validate_dimensions().is_ok());
        f.h = 0.0;
        assert!(f.validate_dimensions().is_err());
    }
}
