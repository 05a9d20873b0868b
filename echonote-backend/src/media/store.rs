//! Audio blob storage on local disk.
//!
//! Plays the role of the object-storage service: uploads land here under a
//! fresh opaque filename and are served back at a stable public URL.

use std::path::PathBuf;
use uuid::Uuid;

/// Allowed audio extensions for upload and serving
pub const ALLOWED_EXTENSIONS: &[&str] = &["webm", "ogg", "mp3", "m4a", "wav"];

/// Get MIME type for an audio extension
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext {
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// Check if a filename has an allowed audio extension
pub fn is_allowed_audio(filename: &str) -> bool {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Disk-backed store for uploaded audio objects
pub struct MediaStore {
    media_dir: PathBuf,
}

impl MediaStore {
    pub fn new(media_dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&media_dir)?;
        Ok(Self { media_dir })
    }

    /// Persist an uploaded blob under a fresh opaque name; returns the
    /// stored filename.
    pub fn save(&self, data: &[u8], ext: &str) -> std::io::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), ext.to_lowercase());
        std::fs::write(self.media_dir.join(&filename), data)?;
        Ok(filename)
    }

    /// Resolve a stored filename to its path, refusing traversal attempts,
    /// hidden files, and non-audio names.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.starts_with('.')
        {
            return None;
        }
        if !is_allowed_audio(filename) {
            return None;
        }

        let path = self.media_dir.join(filename);
        if path.is_file() { Some(path) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_resolve() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("media")).unwrap();

        let filename = store.save(b"fake audio bytes", "webm").unwrap();
        assert!(filename.ends_with(".webm"));

        let path = store.resolve(&filename).expect("saved file should resolve");
        assert_eq!(std::fs::read(path).unwrap(), b"fake audio bytes");
    }

    #[test]
    fn test_resolve_rejects_traversal_and_unknown_types() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("media")).unwrap();

        assert!(store.resolve("../secret.webm").is_none());
        assert!(store.resolve("a/b.webm").is_none());
        assert!(store.resolve(".hidden.webm").is_none());
        assert!(store.resolve("script.sh").is_none());
        assert!(store.resolve("missing.webm").is_none());
    }

    #[test]
    fn test_extension_allowlist() {
        assert!(is_allowed_audio("clip.webm"));
        assert!(is_allowed_audio("CLIP.MP3"));
        assert!(!is_allowed_audio("notes.txt"));
        assert_eq!(mime_for_ext("ogg"), "audio/ogg");
    }
}
