// FICHIER : symdb/src/json_db/storage/mod.rs

pub mod file_storage;
pub mod pool;

use crate::utils::data::{Deserialize, Serialize, Value};
use crate::utils::{AppError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use file_storage::FsStorage;
pub use pool::IoPool;

// --- TYPE DE LIEN D'INDEX ---

/// Forme physique d'une entrée d'index `index/<champ>/<valeur>/<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Lien symbolique relatif vers `../../../store/<id>.json`.
    #[default]
    Symlink,
    /// Lien physique vers le fichier du store.
    Hard,
    /// Simple fichier marqueur vide : seul le nom porte l'id.
    EmptyFile,
}

impl FromStr for LinkType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symlink" | "sym" | "soft" => Ok(LinkType::Symlink),
            "hard" => Ok(LinkType::Hard),
            "empty_file" | "empty" => Ok(LinkType::EmptyFile),
            other => Err(AppError::Config(format!("Type de lien inconnu : '{}'", other))),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkType::Symlink => "symlink",
            LinkType::Hard => "hard",
            LinkType::EmptyFile => "empty_file",
        };
        f.write_str(s)
    }
}

// --- CONTRAT DU BACKEND ---

/// Capacité disque bloquante consommée par le moteur.
///
/// Les erreurs sont classées (`NotFound`, `AlreadyExists`, ...) mais jamais
/// tolérées ici : c'est l'indexeur et les recherches qui appliquent leurs règles.
/// Les deux disciplines d'exécution (sync et async) passent par ce même contrat.
pub trait StorageBackend: Send + Sync {
    /// Écrit une valeur JSON, dossiers parents créés au besoin.
    fn write_document(&self, path: &Path, value: &Value) -> Result<()>;

    /// `NotFound` si absent, `MalformedDocument` si le JSON est invalide.
    fn read_document(&self, path: &Path) -> Result<Value>;

    fn delete_file(&self, path: &Path) -> Result<()>;

    /// `target` est exprimé relativement au dossier du lien.
    fn create_link(&self, target: &Path, link: &Path) -> Result<()>;

    /// Noms des entrées, dans un ordre stable.
    fn list_directory(&self, path: &Path) -> Result<Vec<String>>;

    fn write_blob(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    fn read_blob(&self, path: &Path) -> Result<Vec<u8>>;

    /// Supprime un dossier vide.
    fn remove_dir(&self, path: &Path) -> Result<()>;
}
