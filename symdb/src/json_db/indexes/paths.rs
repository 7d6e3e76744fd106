// FICHIER : symdb/src/json_db/indexes/paths.rs

use super::codec::escape;
use std::path::{Path, PathBuf};

const STORE_DIR: &str = "store";
const INDEX_DIR: &str = "index";
const INDEX_LINKS_DIR: &str = "index-links";
const BLOB_DIR: &str = "blob";
const JSON_EXT: &str = ".json";

/// Sortes de chemins d'une collection.
/// Les valeurs (`value`) sont des segments déjà codés par le schéma ;
/// les noms de champs et les ids sont échappés ici.
#[derive(Debug, Clone, Copy)]
pub enum PathKind<'a> {
    /// `store/<id>.json`
    Store { id: &'a str },
    /// `store`
    StoreDir,
    /// `../../../store/<id>.json`, relatif au dossier du lien
    LinkTarget { id: &'a str },
    /// `index/<field>/<value>/<id>`
    Link { field: &'a str, value: &'a str, id: &'a str },
    /// `index-links/<id>.json`
    IndexLinks { id: &'a str },
    /// `index/<field>/<value>`
    IndexValueDir { field: &'a str, value: &'a str },
    /// `index/<field>`
    IndexFieldDir { field: &'a str },
    /// `blob/<id>`
    BlobDir { id: &'a str },
    /// `blob/<id>/<key>`
    BlobKey { id: &'a str, key: &'a str },
}

/// Résolveur pur des chemins d'une collection `<root>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPaths {
    root: PathBuf,
}

impl CollectionPaths {
    pub fn new(db_root: &Path, collection: &str) -> Self {
        Self {
            root: db_root.join(escape(collection)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Chemin relatif à la racine de la collection.
    pub fn relative(&self, kind: PathKind<'_>) -> PathBuf {
        match kind {
            PathKind::Store { id } => Path::new(STORE_DIR).join(store_file(id)),
            PathKind::StoreDir => PathBuf::from(STORE_DIR),
            PathKind::LinkTarget { id } => Path::new("..")
                .join("..")
                .join("..")
                .join(STORE_DIR)
                .join(store_file(id)),
            PathKind::Link { field, value, id } => Path::new(INDEX_DIR)
                .join(escape(field))
                .join(value)
                .join(escape(id)),
            PathKind::IndexLinks { id } => Path::new(INDEX_LINKS_DIR).join(store_file(id)),
            PathKind::IndexValueDir { field, value } => {
                Path::new(INDEX_DIR).join(escape(field)).join(value)
            }
            PathKind::IndexFieldDir { field } => Path::new(INDEX_DIR).join(escape(field)),
            PathKind::BlobDir { id } => Path::new(BLOB_DIR).join(escape(id)),
            PathKind::BlobKey { id, key } => {
                Path::new(BLOB_DIR).join(escape(id)).join(escape(key))
            }
        }
    }

    /// Chemin utilisable sur disque. `LinkTarget` reste relatif (cible de lien).
    pub fn resolve(&self, kind: PathKind<'_>) -> PathBuf {
        match kind {
            PathKind::LinkTarget { .. } => self.relative(kind),
            _ => self.root.join(self.relative(kind)),
        }
    }

    /// Entrée de manifeste, relative à la collection -> chemin disque.
    pub fn from_manifest(&self, entry: &str) -> PathBuf {
        self.root.join(entry)
    }
}

fn store_file(id: &str) -> String {
    format!("{}{}", escape(id), JSON_EXT)
}

/// Nom d'entrée du store -> id, `None` si ce n'est pas un document.
pub fn id_from_store_entry(entry: &str) -> Option<String> {
    entry
        .strip_suffix(JSON_EXT)
        .filter(|stem| !stem.is_empty())
        .map(super::codec::unescape)
}

/// Nom d'entrée d'un dossier de valeur -> id.
pub fn id_from_link_entry(entry: &str) -> String {
    super::codec::unescape(entry.strip_suffix(JSON_EXT).unwrap_or(entry))
}
