//! Product Catalog - formats, sign assets and price tables

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::category::SignImages;
use crate::error::{QuoteError, Result};
use crate::formats::{Format, HoleType, Shape, ViewBox};
use crate::pricing::PricingTable;
use crate::ENGINE_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default = "default_version")]
    pub catalog_version: String,
    #[serde(default = "default_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(default)]
    pub sign_images: SignImages,
    #[serde(default)]
    pub pricing: PricingTable,
}

fn default_version() -> String { "1.0.0".to_string() }

fn rect(id: &str, label: &str, w: f64, h: f64, view_box: [f64; 4], hole: HoleType) -> Format {
    Format {
        id: id.to_string(),
        label: label.to_string(),
        shape: Shape::Rect,
        w,
        h,
        view_box: ViewBox::new(view_box[0], view_box[1], view_box[2], view_box[3]),
        hole: Some(hole),
    }
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            catalog_version: default_version(),
            engine_min_version: default_version(),
            formats: vec![],
            sign_images: SignImages::new(),
            pricing: PricingTable::default(),
        }
    }

    /// The stock catalog: the 5x3 custom plate, one plate per phenolic preset size,
    /// and the phenolic sign artwork.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.formats = vec![
            rect("rect-5x3", "Rectangle - 5.00x3.00\"", 5.0, 3.0, [0.0, 0.0, 500.0, 300.0], HoleType::None),
            rect("phenolic-1x3", "Phenolic - 3.00x1.00\"", 3.0, 1.0, [0.0, 0.0, 600.0, 200.0], HoleType::None),
            rect("phenolic-1.5x4.5", "Phenolic - 4.50x1.50\"", 4.5, 1.5, [0.0, 0.0, 600.0, 200.0], HoleType::None),
            rect("phenolic-2x6", "Phenolic - 6.00x2.00\"", 6.0, 2.0, [0.0, 0.0, 600.0, 200.0], HoleType::None),
            rect("phenolic-3x9", "Phenolic - 9.00x3.00\"", 9.0, 3.0, [0.0, 0.0, 600.0, 200.0], HoleType::None),
            rect("phenolic-4x12", "Phenolic - 12.00x4.00\"", 12.0, 4.0, [0.0, 0.0, 600.0, 200.0], HoleType::None),
        ];
        for (sign_type, file) in [
            ("high_voltage", "High_Voltage.jpg"),
            ("danger", "Danger.jpg"),
            ("warning", "Warning.jpg"),
            ("caution", "Caution.jpg"),
            ("notice", "Notice.jpg"),
        ] {
            catalog
                .sign_images
                .insert(sign_type.to_string(), format!("assets/phenolic/{}", file));
        }
        catalog
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuoteError::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// Merge every `*.json` catalog in `dir` over an empty catalog, in file name order.
    /// Files that fail to parse are skipped with a warning.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(QuoteError::CatalogNotFound {
                path: dir.to_path_buf(),
            });
        }
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        let mut catalog = Self::empty();
        for path in paths {
            match Self::load_from_file(&path) {
                Ok(part) => catalog.merge(part),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping catalog file"),
            }
        }
        Ok(catalog)
    }

    /// Load a catalog file or directory.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::load_from_dir(path)
        } else {
            Self::load_from_file(path)
        }
    }

    /// Later formats and sign images replace earlier ones with the same key;
    /// the later pricing table and versions win.
    pub fn merge(&mut self, other: Catalog) {
        for format in other.formats {
            self.register_format(format);
        }
        self.sign_images.extend(other.sign_images);
        self.pricing = other.pricing;
        self.catalog_version = other.catalog_version;
        self.engine_min_version = other.engine_min_version;
    }

    pub fn format(&self, id: &str) -> Option<&Format> {
        self.formats.iter().find(|f| f.id == id)
    }

    pub fn list_formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn register_format(&mut self, format: Format) {
        match self.formats.iter_mut().find(|f| f.id == format.id) {
            Some(existing) => *existing = format,
            None => self.formats.push(format),
        }
    }

    /// Refuse catalogs written for a newer engine.
    pub fn check_engine_version(&self) -> Result<()> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| QuoteError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| QuoteError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(QuoteError::EngineVersionMismatch(
                self.catalog_version.clone(),
                self.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
