//! Remote resource fetching.
//!
//! Processors never build HTTP clients of their own. They reach the network
//! through a [`Fetch`] implementation handed to them in the render context,
//! so a CLI run uses [`HttpFetcher`] and tests use [`MemoryFetcher`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::QuireError;

/// Fetches raw bytes by URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuireError>;

    /// Bytes of an `http(s)` URL or a local file path.
    fn load(&self, source: &str) -> Result<Vec<u8>, QuireError> {
        if is_remote(source) {
            return self.fetch(source);
        }
        let path = Path::new(source);
        if !path.is_file() {
            return Err(QuireError::Fetch(format!("File not found: {}", source)));
        }
        Ok(std::fs::read(path)?)
    }
}

pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Blocking HTTP fetcher with a per-request timeout. Responses are cached
/// for the fetcher's lifetime, so one document downloads each URL once.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    cache: Mutex<HashMap<String, Vec<u8>>>,
}

impl HttpFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Result<Self, QuireError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, QuireError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| QuireError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            cache: Mutex::new(HashMap::new()),
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuireError> {
        let cached = self.cache.lock().ok().and_then(|cache| cache.get(url).cloned());
        if let Some(hit) = cached {
            log::debug!("fetch cache hit: {}", url);
            return Ok(hit);
        }

        log::info!("downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| QuireError::Fetch(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(QuireError::Fetch(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| QuireError::Fetch(format!("Failed to read {}: {}", url, e)))?
            .to_vec();

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url.to_string(), bytes.clone());
        }
        Ok(bytes)
    }
}

/// Serves canned responses; unknown URLs fail. Used for offline runs.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.into(), bytes);
        self
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, QuireError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| QuireError::Fetch(format!("Failed to download {}: offline", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/a.png"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("/tmp/a.png"));
        assert!(!is_remote("ftp://x"));
    }

    #[test]
    fn test_memory_fetcher() {
        let f = MemoryFetcher::new().with("http://x/a", vec![1, 2, 3]);
        assert_eq!(f.fetch("http://x/a").unwrap(), vec![1, 2, 3]);
        assert!(f.fetch("http://x/b").is_err());
    }

    #[test]
    fn test_load_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abc").unwrap();
        let f = MemoryFetcher::new();
        assert_eq!(f.load(path.to_str().unwrap()).unwrap(), b"abc");
        let err = f.load("/definitely/not/here.png").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
