// FICHIER : symdb/src/utils/error.rs

use std::io;
use std::path::{Path, PathBuf};

// --- RE-EXPORTS ANYHOW (Pour la flexibilité du code applicatif) ---
pub use anyhow::{anyhow, Context};
// On renomme le Result de anyhow pour ne pas qu'il écrase le nôtre
pub use anyhow::Result as AnyResult;

/// Type de résultat standard de SymDb.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs.
/// Chaque variante liée au disque porte le chemin fautif pour le diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Introuvable : {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Existe déjà : {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Erreur d'entrée/sortie sur {} : {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Document illisible (JSON invalide) : {} : {source}", path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Précondition non satisfaite : {0}")]
    Precondition(String),

    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),
}

impl AppError {
    /// Classe une erreur d'I/O brute en conservant le chemin concerné.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => AppError::NotFound { path },
            io::ErrorKind::AlreadyExists => AppError::AlreadyExists { path },
            _ => AppError::Io { path, source },
        }
    }

    pub fn malformed(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        AppError::MalformedDocument {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, AppError::AlreadyExists { .. })
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::System(anyhow::anyhow!("Tâche bloquante interrompue : {}", e))
    }
}
