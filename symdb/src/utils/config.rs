// FICHIER : symdb/src/utils/config.rs

use crate::json_db::storage::LinkType;
use crate::utils::error::{AppError, Result};
use crate::utils::{env, json};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fenêtre de concurrence par défaut des opérations disque parallèles.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Variables d'environnement reconnues
pub const ENV_ROOT: &str = "SYMDB_ROOT";
pub const ENV_LINK_TYPE: &str = "SYMDB_LINK_TYPE";
pub const ENV_CONCURRENCY: &str = "SYMDB_CONCURRENCY";
pub const ENV_BLOBS: &str = "SYMDB_BLOBS";
pub const ENV_LOG_DIR: &str = "SYMDB_LOG_DIR";

/// Configuration d'une base SymDb.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbConfig {
    /// Racine du stockage : une collection = un sous-dossier.
    pub root: PathBuf,

    #[serde(default)]
    pub link_type: LinkType,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Active le plugin d'extraction des blobs binaires.
    #[serde(default)]
    pub blobs: bool,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl DbConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            link_type: LinkType::default(),
            concurrency: DEFAULT_CONCURRENCY,
            blobs: false,
            log_dir: None,
        }
    }

    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = link_type;
        self
    }

    pub fn with_concurrency(mut self, window: usize) -> Self {
        self.concurrency = window;
        self
    }

    pub fn with_blobs(mut self, enabled: bool) -> Self {
        self.blobs = enabled;
        self
    }

    /// Charge la configuration depuis un fichier JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let cfg: DbConfig = json::parse(&content).map_err(|e| {
            AppError::Config(format!("Fichier {} invalide : {}", path.display(), e))
        })?;
        cfg.validate()
    }

    /// Construit la configuration uniquement à partir de l'environnement.
    /// `SYMDB_ROOT` est obligatoire.
    pub fn from_env() -> Result<Self> {
        let root = env::get(ENV_ROOT)?;
        DbConfig::new(root).with_env_overrides()
    }

    /// Surcharge les champs présents dans l'environnement.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(root) = env::get_optional(ENV_ROOT) {
            self.root = PathBuf::from(root);
        }
        if let Some(raw) = env::get_optional(ENV_LINK_TYPE) {
            self.link_type = raw.parse()?;
        }
        if env::get_optional(ENV_CONCURRENCY).is_some() {
            self.concurrency = env::get_parsed(ENV_CONCURRENCY)?;
        }
        if env::get_optional(ENV_BLOBS).is_some() {
            self.blobs = env::is_enabled(ENV_BLOBS);
        }
        if let Some(dir) = env::get_optional(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.root.as_os_str().is_empty() {
            return Err(AppError::Config("La racine du stockage est vide".into()));
        }
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "La fenêtre de concurrence doit être >= 1".into(),
            ));
        }
        Ok(self)
    }
}
