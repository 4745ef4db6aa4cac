use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{BannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFormat {
    Desktop,
    Mobile,
    #[serde(alias = "mobile/desktop", alias = "desktop/mobile")]
    Mixed,
}

impl fmt::Display for LayoutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutFormat::Desktop => write!(f, "desktop"),
            LayoutFormat::Mobile => write!(f, "mobile"),
            LayoutFormat::Mixed => write!(f, "mobile/desktop"),
        }
    }
}

/// A named target canvas. Each layout drives one independent generation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: LayoutFormat,
}

impl Layout {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: LayoutFormat,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            format,
        }
    }

    /// `width:height`, unreduced.
    pub fn aspect_ratio(&self) -> String {
        format!("{}:{}", self.width, self.height)
    }

    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// The built-in catalog.
    pub fn catalog() -> Vec<Layout> {
        vec![
            Layout::new("main-desktop", "Main banner (Desktop)", 1920, 600, LayoutFormat::Desktop),
            Layout::new("promo-square", "Promo banner (Square)", 1080, 1080, LayoutFormat::Mixed),
            Layout::new("story-vertical", "Story banner", 1080, 1920, LayoutFormat::Mobile),
            Layout::new("category-banner", "Category banner (Desktop)", 1200, 400, LayoutFormat::Desktop),
            Layout::new("product-tile", "Product tile (Promo)", 800, 800, LayoutFormat::Mixed),
            Layout::new("side-banner-mobile", "Side banner (Mobile)", 600, 1200, LayoutFormat::Mobile),
        ]
    }

    /// Loads a JSON array of layouts, rejecting empty catalogs, zero sizes and duplicate ids.
    pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Layout>> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let layouts: Vec<Layout> = serde_json::from_str(&raw)?;

        if layouts.is_empty() {
            return Err(BannerError::ConfigError(format!(
                "Layout catalog {} is empty",
                path.display()
            )));
        }

        for (idx, layout) in layouts.iter().enumerate() {
            if layout.width == 0 || layout.height == 0 {
                return Err(BannerError::ConfigError(format!(
                    "Layout '{}' has a zero dimension",
                    layout.id
                )));
            }
            if layouts[..idx].iter().any(|other| other.id == layout.id) {
                return Err(BannerError::ConfigError(format!(
                    "Duplicate layout id '{}'",
                    layout.id
                )));
            }
        }

        log::debug!("Loaded {} layouts from {}", layouts.len(), path.display());
        Ok(layouts)
    }
}

pub fn find_layout<'a>(layouts: &'a [Layout], id: &str) -> Result<&'a Layout> {
    layouts
        .iter()
        .find(|layout| layout.id == id)
        .ok_or_else(|| BannerError::UnknownLayout(id.to_string()))
}
