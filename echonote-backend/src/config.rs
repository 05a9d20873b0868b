use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Explicit override for the service's own public URL
    /// (e.g. "https://notes.example.com"). Share and media URLs are built
    /// from it.
    pub const PUBLIC_URL: &str = "ECHONOTE_PUBLIC_URL";
    /// Override for the audio blob directory.
    pub const MEDIA_DIR: &str = "ECHONOTE_MEDIA_DIR";
    /// Base URL of the external speech-to-text service. Transcription is
    /// disabled when unset.
    pub const TRANSCRIBER_URL: &str = "TRANSCRIBER_URL";
    /// Shared secret the upstream identity provider presents when minting
    /// sessions. The mint endpoint is open when unset.
    pub const IDENTITY_GATE_SECRET: &str = "IDENTITY_GATE_SECRET";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/echonote.db";
    pub const MEDIA_DIR: &str = "media";
}

/// Returns the absolute path to the echonote-backend directory.
/// Uses CARGO_MANIFEST_DIR at compile time, so it always resolves
/// to echonote-backend/ regardless of the working directory at runtime.
pub fn backend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Get the audio media directory
pub fn media_dir() -> PathBuf {
    match env::var(env_vars::MEDIA_DIR) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => backend_dir().join(defaults::MEDIA_DIR),
    }
}

/// Get the service's own public URL (for constructing absolute share and
/// media URLs).
///
/// Falls back to http://localhost:{PORT} if not set.
pub fn self_url() -> String {
    if let Ok(url) = env::var(env_vars::PUBLIC_URL) {
        return url.trim_end_matches('/').to_string();
    }

    let port = env::var(env_vars::PORT).unwrap_or_else(|_| defaults::PORT.to_string());
    format!("http://localhost:{}", port)
}

/// Public share URL for a note and token.
pub fn share_url(note_id: &str, token: &str) -> String {
    format!("{}/share/{}?token={}", self_url(), note_id, token)
}

/// Public URL for a stored media object.
pub fn media_url(filename: &str) -> String {
    format!("{}/media/{}", self_url(), filename)
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub transcriber_url: Option<String>,
    pub identity_gate_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            transcriber_url: env::var(env_vars::TRANSCRIBER_URL)
                .ok()
                .filter(|s| !s.is_empty()),
            identity_gate_secret: env::var(env_vars::IDENTITY_GATE_SECRET)
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_shape() {
        let url = share_url("note-1", "tok123");
        assert!(url.ends_with("/share/note-1?token=tok123"));
    }

    #[test]
    fn test_media_url_shape() {
        let url = media_url("clip.webm");
        assert!(url.ends_with("/media/clip.webm"));
    }
}
