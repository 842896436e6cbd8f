// Media store
// Persists extracted clip bytes under the configured media root and hands
// back the path used as the segment's clip URI.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Filesystem store for extracted clips.
/// Layout: `<root>/audio_segments/<safe_title>/segment_<id>.<ext>`
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a clip and return its absolute path as a URI string
    pub fn save_clip(
        &self,
        source_title: &str,
        segment_id: &str,
        format: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let dir = self
            .root
            .join("audio_segments")
            .join(safe_title(source_title));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create clip directory: {}", dir.display()))?;

        let path = dir.join(format!("segment_{}.{}", segment_id, format));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write clip file: {}", path.display()))?;

        log::info!("Saved {} byte clip to {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Remove a previously saved clip. Missing files are fine; a re-clip may
    /// already have replaced them.
    pub fn remove_clip(&self, clip_uri: &str) -> Result<()> {
        match std::fs::remove_file(clip_uri) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove clip: {}", clip_uri)),
        }
    }
}

/// Filesystem-safe version of a track title
fn safe_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_clip_layout() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let uri = store
            .save_clip("Sam Smith - Beautiful!", "seg_abc", "mp3", b"mp3bytes")
            .unwrap();

        assert!(uri.contains("audio_segments"));
        assert!(uri.contains("Sam_Smith___Beautiful_"));
        assert!(uri.ends_with("segment_seg_abc.mp3"));
        assert_eq!(std::fs::read(&uri).unwrap(), b"mp3bytes");
    }

    #[test]
    fn test_remove_clip_tolerates_missing() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let uri = store.save_clip("t", "seg_1", "mp3", b"x").unwrap();
        store.remove_clip(&uri).unwrap();
        store.remove_clip(&uri).unwrap();
    }

    #[test]
    fn test_safe_title() {
        assert_eq!(safe_title("Man I Am"), "Man_I_Am");
        assert_eq!(safe_title("héllo"), "héllo");
    }
}
