//! Local-directory file store

use super::FileStore;
use crate::error::Result;
use bytes::Bytes;
use std::fs;
use std::path::{Path, PathBuf};

/// `FileStore` rooted at a data directory on the local filesystem
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                Self::walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, path: &str) -> Result<Bytes> {
        Ok(Bytes::from(fs::read(self.resolve(path))?))
    }

    fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, data)?;
        Ok(())
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path).exists())
    }

    fn list_recursive(&self, prefix: &str) -> Result<Vec<String>> {
        let base = self.resolve(prefix);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        Self::walk(&base, &mut found)?;

        let mut paths: Vec<String> = found
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(&self.root)
                    .ok()
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}
