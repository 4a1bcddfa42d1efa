//! File-backed script resources.
//!
//! Shipped content is a flat directory of `.ksc` files named by zero-padded
//! resource id, e.g. resource 7 lives at `<data_dir>/0007.ksc`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DirResources {
    dir: PathBuf,
}

impl DirResources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, res: u16) -> PathBuf {
        self.dir.join(format!("{res:04}.ksc"))
    }

    /// A missing or unreadable resource is fatal to the run; the scripts
    /// reference each other by id and a broken reference means broken content.
    pub fn read(&self, res: u16) -> Result<Vec<u8>> {
        let path = self.path_for(res);
        std::fs::read(&path).with_context(|| format!("script resource {}", path.display()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
