use std::path::{Path, PathBuf};

use crate::{error::Result, models::Layout};

const PROMPT_FRAGMENT_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameStyle {
    /// `main_banner__desktop__1920x600.png`
    #[default]
    Dimensions,
    /// `Main_banner-spring_sale.png`
    PromptFragment,
}

/// Lowercases and replaces everything outside `[a-z0-9]` with `_`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect()
}

/// Keeps letters, digits, `-` and `_`; every other character becomes `_`.
fn path_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub fn banner_filename(layout: &Layout, prompt: &str, style: FilenameStyle) -> String {
    match style {
        FilenameStyle::Dimensions => format!(
            "{}_{}x{}.png",
            slugify(&layout.name),
            layout.width,
            layout.height
        ),
        FilenameStyle::PromptFragment => {
            let fragment: String = prompt.trim().chars().take(PROMPT_FRAGMENT_CHARS).collect();
            let fragment = if fragment.is_empty() {
                "banner".to_string()
            } else {
                path_safe(&fragment)
            };
            format!("{}-{}.png", path_safe(&layout.name), fragment)
        }
    }
}

/// Writes the image bytes as-is; no re-encoding happens.
pub fn save_png(dir: impl AsRef<Path>, filename: &str, image: &[u8]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, image)?;
    log::info!("💾 Image saved to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LayoutFormat;

    fn layout() -> Layout {
        Layout::new("main-desktop", "Main banner (Desktop)", 1920, 600, LayoutFormat::Desktop)
    }

    #[test]
    fn test_dimensions_filename() {
        assert_eq!(
            banner_filename(&layout(), "ignored", FilenameStyle::Dimensions),
            "main_banner__desktop__1920x600.png"
        );
        assert_eq!(slugify("Банер 1"), "______1");
    }

    #[test]
    fn test_prompt_fragment_filename() {
        assert_eq!(
            banner_filename(&layout(), "spring sale -50% on hair dryers", FilenameStyle::PromptFragment),
            "Main_banner__Desktop_-spring_sale_-50__on_.png"
        );
        assert_eq!(
            banner_filename(&layout(), "   ", FilenameStyle::PromptFragment),
            "Main_banner__Desktop_-banner.png"
        );
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_png(dir.path().join("out"), "a.png", &[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
