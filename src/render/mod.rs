//! Result-card renderer.
//!
//! Fonts and the logo are process-wide, loaded once at startup and read-only
//! afterwards. A card still renders when any of them is missing.

mod canvas;
mod card;

use ab_glyph::FontArc;
use image::RgbaImage;
use std::{path::Path, sync::OnceLock};
use tracing::{info, warn};

use crate::config::Config;

pub(crate) use card::display_name;
pub use card::{render_card, CARD_HEIGHT, CARD_WIDTH};

static ASSETS: OnceLock<Assets> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// Immutable rendering resources.
#[derive(Default)]
pub struct Assets {
    pub medium: Option<FontArc>,
    pub semibold: Option<FontArc>,
    pub logo: Option<RgbaImage>,
}

impl Assets {
    pub fn load(config: &Config) -> Self {
        Self {
            medium: load_font(&config.font_medium_path),
            semibold: load_font(&config.font_semibold_path),
            logo: load_logo(&config.logo_path),
        }
    }

    /// Font for body text, falling back to the heavier face.
    fn body_font(&self) -> Option<&FontArc> {
        self.medium.as_ref().or(self.semibold.as_ref())
    }

    /// Font for headings, falling back to the body face.
    fn heading_font(&self) -> Option<&FontArc> {
        self.semibold.as_ref().or(self.medium.as_ref())
    }
}

/// Load the shared assets. Later calls keep the first set.
pub fn init_assets(config: &Config) -> &'static Assets {
    ASSETS.get_or_init(|| {
        let assets = Assets::load(config);
        info!(
            "🖼️  Card assets loaded (medium font: {}, semibold font: {}, logo: {})",
            assets.medium.is_some(),
            assets.semibold.is_some(),
            assets.logo.is_some()
        );
        assets
    })
}

/// Shared assets, or an empty set if startup never loaded any.
pub fn assets() -> &'static Assets {
    ASSETS.get_or_init(Assets::default)
}

fn load_font(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("⚠️ Could not read font {}: {}", path.display(), e);
            return None;
        }
    };

    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("⚠️ Invalid font file {}: {}", path.display(), e);
            None
        }
    }
}

fn load_logo(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            warn!("⚠️ Could not load logo {}: {}", path.display(), e);
            None
        }
    }
}
