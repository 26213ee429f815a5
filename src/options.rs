use std::path::{Path, PathBuf};

use crate::error::Error;

pub const DEFAULT_TERMS: [&str; 6] = [
    "1. All rates are ex-works.",
    "2. All taxes & cartage will be charged extra as actual.",
    "3. Supply of materials will start within 4-5 days after receiving confirmed purchase order along with advance payment.",
    "4. Unloading & proper storage of materials at site will be in your scope.",
    "5. Payment terms: 100% advance along with confirmed commercial purchase order.",
    "6. Please revert back for any clarification.",
];

/// Encoded watermark image (PNG or JPEG).
#[derive(Clone, Debug)]
pub struct Watermark {
    pub data: Vec<u8>,
}

impl Watermark {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        Ok(Self { data })
    }
}

/// Everything about a render that does not come from the request itself.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub watermark: Option<Watermark>,
    /// TrueType/OpenType file for body text. Built-in Helvetica when unset.
    pub regular_font: Option<PathBuf>,
    /// TrueType/OpenType file for bold text. Built-in Helvetica-Bold when unset.
    pub bold_font: Option<PathBuf>,
    pub terms: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            watermark: None,
            regular_font: None,
            bold_font: None,
            terms: DEFAULT_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl RenderOptions {
    /// Defaults overlaid with `GSTDOC_WATERMARK`, `GSTDOC_FONT_REGULAR` and
    /// `GSTDOC_FONT_BOLD` when set.
    pub fn from_env() -> Result<Self, Error> {
        let mut opts = Self::default();
        if let Some(path) = env_path("GSTDOC_WATERMARK") {
            opts.watermark = Some(Watermark::from_path(&path)?);
        }
        opts.regular_font = env_path("GSTDOC_FONT_REGULAR");
        opts.bold_font = env_path("GSTDOC_FONT_BOLD");
        Ok(opts)
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    let val = std::env::var(var).ok()?;
    let trimmed = val.trim();
    if trimmed.is_empty() {
        None
    } else {
        log::debug!("{var}={trimmed}");
        Some(PathBuf::from(trimmed))
    }
}
