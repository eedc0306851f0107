//! Tag configuration state and shareable configuration links.
//!
//! `TagConfig` is owned by the caller and passed into every engine call; nothing in
//! the engine keeps a copy between calls.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::category::CUSTOM_SIGN_TYPE;
use crate::error::{QuoteError, Result};
use crate::formats::{Format, HoleType};
use crate::layout::{TextCase, DEFAULT_FONT_FAMILY};
use crate::pricing::lenient_qty;
use crate::production::{Adhesive, ProductionSpec};

pub const SHARE_TOKEN_PREFIX: &str = "cfg=";
pub const DEFAULT_FORMAT_ID: &str = "rect-5x3";

/// Everything a customer has chosen for one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagConfig {
    pub format_id: String,
    pub line1: String,
    pub line2: String,
    pub sign_type: String,
    pub font: String,
    pub text_case: TextCase,
    pub top_color: String,
    pub core_color: String,
    /// `auto` follows the core color
    pub text_color: String,
    /// `none` or an outline style carried through to the quote request
    pub outline: String,
    pub hole: HoleType,
    pub adhesive: Adhesive,
    /// Thickness in mm, as entered
    pub thickness: String,
    #[serde(deserialize_with = "lenient_qty")]
    pub qty: i64,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            format_id: DEFAULT_FORMAT_ID.to_string(),
            line1: "PUMP 12".to_string(),
            line2: "480V".to_string(),
            sign_type: CUSTOM_SIGN_TYPE.to_string(),
            font: DEFAULT_FONT_FAMILY.to_string(),
            text_case: TextCase::Upper,
            top_color: "#ffffff".to_string(),
            core_color: "#000000".to_string(),
            text_color: "auto".to_string(),
            outline: "none".to_string(),
            hole: HoleType::H0125,
            adhesive: Adhesive::None,
            thickness: "1.6".to_string(),
            qty: 10,
        }
    }
}

impl TagConfig {
    /// Text lines with the chosen letter case applied.
    pub fn cased_lines(&self) -> Vec<String> {
        [&self.line1, &self.line2]
            .into_iter()
            .map(|l| self.text_case.apply(l))
            .collect()
    }

    pub fn effective_text_color(&self) -> &str {
        if self.text_color == "auto" {
            &self.core_color
        } else {
            &self.text_color
        }
    }

    /// Preset sign types lock the color choices.
    pub fn colors_locked(&self) -> bool {
        self.sign_type != CUSTOM_SIGN_TYPE
    }

    /// Switch to `format`, taking its hole default.
    pub fn select_format(&mut self, format: &Format) {
        self.format_id = format.id.clone();
        self.hole = ProductionSpec::from_format(format).hole;
    }

    pub fn production_spec(&self) -> Result<ProductionSpec> {
        ProductionSpec::from_user(self.hole, self.adhesive, &self.thickness)
    }
}

/// Encode a configuration as a `cfg=<base64url>` link fragment.
pub fn encode_share_token(config: &TagConfig) -> Result<String> {
    let json = serde_json::to_vec(config)?;
    Ok(format!("{}{}", SHARE_TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(json)))
}

/// Decode a link fragment. A leading `#` and trailing `&...` parameters are ignored;
/// fields missing from the token keep their defaults.
pub fn decode_share_token(token: &str) -> Result<TagConfig> {
    let token = token.trim().trim_start_matches('#');
    let encoded = token.strip_prefix(SHARE_TOKEN_PREFIX).unwrap_or(token);
    let encoded = encoded.split('&').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|e| QuoteError::InvalidShareToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| QuoteError::InvalidShareToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_token_restores_config() {
        let config = TagConfig {
            line1: "Valve 7".into(),
            qty: 40,
            text_case: TextCase::Title,
            ..Default::default()
        };
        let token = encode_share_token(&config).unwrap();
        assert!(token.starts_with(SHARE_TOKEN_PREFIX));
        let restored = decode_share_token(&format!("#{}&v=2", token)).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_token_keeps_defaults() {
        let encoded = URL_SAFE_NO_PAD.encode(br#"{"line1":"MOTOR","qty":"75"}"#);
        let config = decode_share_token(&format!("cfg={}", encoded)).unwrap();
        assert_eq!(config.line1, "MOTOR");
        assert_eq!(config.qty, 75);
        assert_eq!(config.line2, "480V");
        assert_eq!(config.format_id, DEFAULT_FORMAT_ID);
    }

    #[test]
    fn test_bad_token() {
        assert!(matches!(
            decode_share_token("cfg=%%%"),
            Err(QuoteError::InvalidShareToken(_))
        ));
    }

    #[test]
    fn test_cased_lines_and_colors() {
        let config = TagConfig::default();
        assert_eq!(config.cased_lines(), vec!["PUMP 12", "480V"]);
        assert_eq!(config.effective_text_color(), "#000000");
        assert!(!config.colors_locked());
        assert_eq!(config.production_spec().unwrap().thickness_mm, 1.6);

        let preset = TagConfig {
            sign_type: "danger".into(),
            text_color: "#ffcc00".into(),
            ..Default::default()
        };
        assert_eq!(preset.effective_text_color(), "#ffcc00");
        assert!(preset.colors_locked());
    }

    #[test]
    fn test_select_format_takes_hole_default() {
        let mut config = TagConfig::default();
        let format: Format = serde_json::from_str(
            r#"{"id":"plate-2x6","label":"Plate","shape":"rect","w":6,"h":2,"viewBox":[0,0,600,200],"hole":"h0187"}"#,
        )
        .unwrap();
        config.select_format(&format);
        assert_eq!(config.format_id, "plate-2x6");
        assert_eq!(config.hole, HoleType::H0187);

        let bare: Format = serde_json::from_str(
            r#"{"id":"bare","label":"Bare","shape":"rect","w":5,"h":3}"#,
        )
        .unwrap();
        config.select_format(&bare);
        assert_eq!(config.hole, HoleType::None);
    }
}
