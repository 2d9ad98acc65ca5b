//! Application list loading and validation.
//!
//! The list is either a JSON array of `{ "app_slug", "name" }` objects or a
//! TOML file with an `[[apps]]` table per application. The format is chosen
//! by file extension; anything other than `.toml` is read as JSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::ci::Application;

#[derive(Debug, Deserialize)]
struct AppsFile {
    #[serde(default)]
    apps: Vec<Application>,
}

/// Load and validate the configured applications.
pub fn load_apps(path: &Path) -> Result<Vec<Application>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read app list: {}", path.display()))?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let apps = if is_toml {
        toml::from_str::<AppsFile>(&content)
            .with_context(|| format!("failed to parse app list: {}", path.display()))?
            .apps
    } else {
        serde_json::from_str::<Vec<Application>>(&content)
            .with_context(|| format!("failed to parse app list: {}", path.display()))?
    };

    validate_apps(&apps)?;
    info!(path = %path.display(), count = apps.len(), "loaded app list");
    Ok(apps)
}

/// Reject lists the run cannot meaningfully start with.
pub fn validate_apps(apps: &[Application]) -> Result<()> {
    if apps.is_empty() {
        bail!("no applications configured");
    }
    for (i, app) in apps.iter().enumerate() {
        if app.app_slug.trim().is_empty() {
            bail!("application #{} ({:?}) has an empty app_slug", i + 1, app.name);
        }
        if app.name.trim().is_empty() {
            bail!("application #{} ({}) has an empty name", i + 1, app.app_slug);
        }
    }
    Ok(())
}
