// Source resolution
// A source location URI is either a local path or an http(s) URL. Remote
// sources are downloaded to a temp file that lives as long as the handle.

use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A locally readable copy of a source track. Dropping the handle removes
/// any temp file created for a remote source.
pub struct SourceHandle {
    path: PathBuf,
    _temp: Option<tempfile::NamedTempFile>,
}

impl SourceHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolve a location URI to readable bytes on disk
pub async fn resolve_source(location_uri: &str) -> Result<SourceHandle> {
    if location_uri.starts_with("http://") || location_uri.starts_with("https://") {
        download_to_temp(location_uri).await
    } else {
        let path = PathBuf::from(location_uri);
        if !path.exists() {
            return Err(anyhow!("Source audio not found: {}", location_uri));
        }
        Ok(SourceHandle { path, _temp: None })
    }
}

async fn download_to_temp(url: &str) -> Result<SourceHandle> {
    log::info!("Downloading source audio from {}", url);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to download source audio: {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!("Source download returned {}: {}", response.status(), url));
    }

    let bytes = response
        .bytes()
        .await
        .context("Failed to read source audio body")?;

    let mut temp = tempfile::Builder::new()
        .suffix(".mp3")
        .tempfile()
        .context("Failed to create temp file for source audio")?;
    temp.write_all(&bytes)
        .context("Failed to write source audio to temp file")?;
    temp.flush().ok();

    let path = temp.path().to_path_buf();
    log::debug!("Source audio cached at {}", path.display());

    Ok(SourceHandle {
        path,
        _temp: Some(temp),
    })
}
