// FICHIER : symdb/src/json_db/storage/file_storage.rs

use super::{LinkType, StorageBackend};
use crate::utils::data::Value;
use crate::utils::fs;
use crate::utils::Result;
use std::path::Path;
use tracing::trace;

/// Backend disque local (std::fs).
#[derive(Debug, Clone, Default)]
pub struct FsStorage {
    link_type: LinkType,
}

impl FsStorage {
    pub fn new(link_type: LinkType) -> Self {
        Self { link_type }
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
}

impl StorageBackend for FsStorage {
    fn write_document(&self, path: &Path, value: &Value) -> Result<()> {
        fs::write_json(path, value)
    }

    fn read_document(&self, path: &Path) -> Result<Value> {
        fs::read_json(path)
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
    }

    fn create_link(&self, target: &Path, link: &Path) -> Result<()> {
        trace!(link = ?link, target = ?target, kind = %self.link_type, "Création du lien");
        match self.link_type {
            LinkType::Symlink => fs::symlink(target, link),
            LinkType::Hard => {
                // La cible relative est résolue depuis le dossier du lien
                let resolved = match link.parent() {
                    Some(dir) => dir.join(target),
                    None => target.to_path_buf(),
                };
                fs::hard_link(&resolved, link)
            }
            LinkType::EmptyFile => fs::touch_new(link),
        }
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<String>> {
        fs::list_dir(path)
    }

    fn write_blob(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write_atomic(path, bytes)
    }

    fn read_blob(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path)
    }
}
