use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::export::ExportSettings;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub draft_path: PathBuf,
    pub export_dir: PathBuf,
    /// TTF/OTF used for glyph outlines. Without it text is drawn as greeked bars.
    pub font_path: Option<PathBuf>,
    pub autosave_quiet: Duration,
    pub raster_scale: f32,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let quiet_ms: u64 = parse_var(
            "STUDIO_AUTOSAVE_QUIET_MS",
            optional_env("STUDIO_AUTOSAVE_QUIET_MS"),
            1000,
        )?;
        let raster_scale: f32 = parse_var(
            "STUDIO_RASTER_SCALE",
            optional_env("STUDIO_RASTER_SCALE"),
            2.0,
        )?;
        ensure!(
            raster_scale.is_finite() && raster_scale > 0.0,
            "STUDIO_RASTER_SCALE must be a positive number, got {raster_scale}"
        );

        Ok(Config {
            draft_path: optional_env("STUDIO_DRAFT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("resume-draft.json")),
            export_dir: optional_env("STUDIO_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("exports")),
            font_path: optional_env("STUDIO_FONT_PATH").map(PathBuf::from),
            autosave_quiet: Duration::from_millis(quiet_ms),
            raster_scale,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            scale: self.raster_scale,
            export_dir: self.export_dir.clone(),
            ..ExportSettings::default()
        }
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
