//! Output directories for generated artifacts.
//!
//! Everything a build writes lands under one root (`generated_docs/` by
//! default): rasterized charts, downloaded images and finished PDFs, each in
//! its own subdirectory. Directories are created the first time a file is
//! placed in them.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::QuireError;

pub const DEFAULT_ROOT: &str = "generated_docs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Charts,
    Images,
    Pdfs,
}

impl OutputKind {
    fn dir_name(self) -> &'static str {
        match self {
            OutputKind::Charts => "charts",
            OutputKind::Images => "images",
            OutputKind::Pdfs => "pdfs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    root: PathBuf,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl OutputDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory for `kind`, created if missing.
    pub fn dir(&self, kind: OutputKind) -> Result<PathBuf, QuireError> {
        let dir = self.root.join(kind.dir_name());
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// A fresh path `{prefix}_{YYYYmmdd_HHMMSS}_{uuid8}.{ext}` under `kind`.
    pub fn unique_path(&self, kind: OutputKind, prefix: &str, ext: &str) -> Result<PathBuf, QuireError> {
        Ok(self.dir(kind)?.join(unique_name(prefix, ext)))
    }

    /// Write `bytes` to a fresh file under `kind`.
    pub fn save(&self, kind: OutputKind, prefix: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf, QuireError> {
        let path = self.unique_path(kind, prefix, ext)?;
        fs::write(&path, bytes)?;
        log::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

pub fn unique_name(prefix: &str, ext: &str) -> String {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.{}", prefix, ts, &id[..8], ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("bar_chart", "png");
        assert!(name.starts_with("bar_chart_"));
        assert!(name.ends_with(".png"));
        // prefix, date, time, id
        let stem = name.trim_end_matches(".png");
        let parts: Vec<&str> = stem.rsplitn(3, '_').collect();
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_ne!(unique_name("a", "b"), unique_name("a", "b"));
    }

    #[test]
    fn test_dirs_created_on_demand() {
        let tmp = tempfile::tempdir().unwrap();
        let out = OutputDirs::new(tmp.path().join("docs"));
        assert!(!out.root().exists());
        let path = out.save(OutputKind::Charts, "pie_chart", "png", b"png").unwrap();
        assert!(path.starts_with(tmp.path().join("docs").join("charts")));
        assert_eq!(fs::read(path).unwrap(), b"png");
        assert!(!out.root().join("pdfs").exists());
    }
}
