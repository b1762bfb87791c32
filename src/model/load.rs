use anyhow::Context;
use std::path::Path as FsPath;
use tracing::info;

use super::types::Api;
use super::validate::ensure_valid;

/// Parse a model document, choosing the format from the file extension.
///
/// `.yaml`/`.yml` and `.toml` are recognised; anything else is read as JSON.
pub fn parse_api(file_path: &FsPath, content: &str) -> anyhow::Result<Api> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let api = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_json::from_str(content)?,
    };
    Ok(api)
}

/// Read, parse and validate a model file.
///
/// Validation issues fail the load with [`crate::Error::InvalidModel`], which stays
/// reachable through `anyhow::Error::downcast_ref`.
pub fn load_api(file_path: impl AsRef<FsPath>) -> anyhow::Result<Api> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read API model '{}'", file_path.display()))?;
    let api = parse_api(file_path, &content)
        .with_context(|| format!("failed to parse API model '{}'", file_path.display()))?;

    ensure_valid(&api).with_context(|| format!("API model '{}' is invalid", file_path.display()))?;

    info!(
        model = %file_path.display(),
        paths = api.paths.len(),
        operations = api.operations().count(),
        schemes = api.authentication.len(),
        "API model loaded"
    );
    Ok(api)
}
