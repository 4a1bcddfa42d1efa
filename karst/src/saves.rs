//! The save bank: one `.ksv` file per numbered slot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DirSaves {
    dir: PathBuf,
}

impl DirSaves {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, slot: u8) -> PathBuf {
        self.dir.join(format!("save{slot}.ksv"))
    }

    pub fn write(&self, slot: u8, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating save directory {}", self.dir.display()))?;
        let path = self.path_for(slot);
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
    }

    pub fn read(&self, slot: u8) -> Result<Vec<u8>> {
        let path = self.path_for(slot);
        std::fs::read(&path).with_context(|| format!("save slot {}: {}", slot, path.display()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_then_read_round_trips() {
        let dir = std::env::temp_dir().join(format!("karst-saves-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let bank = DirSaves::new(&dir);

        // write creates the directory on demand
        bank.write(3, &[9, 8, 7]).unwrap();
        assert_eq!(bank.read(3).unwrap(), vec![9, 8, 7]);

        let err = bank.read(4).unwrap_err();
        assert!(format!("{err:#}").contains("save slot 4"), "{err:#}");
    }
}
