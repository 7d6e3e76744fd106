// FICHIER : symdb/src/json_db/mod.rs

pub mod collections;
pub mod indexes;
pub mod query;
pub mod storage;

use crate::plugins::{blobs::BlobPlugin, Plugin};
use crate::utils::data::{HashMap, Map, Value};
use crate::utils::fs;
use crate::utils::logger::{init_logging, LogOptions};
use crate::utils::prelude::*;
use crate::utils::{Arc, RwLock};
use std::path::Path;
use std::sync::PoisonError;

use collections::Model;
use indexes::{CollectionPaths, Schema};
use storage::{FsStorage, IoPool, StorageBackend};

/// Un document : objet JSON, identifié par son champ `_id`.
pub type Document = Map<String, Value>;

/// Nouvel identifiant de document (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Ce dont l'indexeur et les recherches ont besoin pour une collection,
/// le temps d'une opération.
pub struct Scope<'a> {
    pub storage: &'a dyn StorageBackend,
    pub paths: &'a CollectionPaths,
    pub schema: &'a Schema,
    pub io: &'a IoPool,
}

impl Scope<'_> {
    /// Charge un document du store ; `None` s'il a disparu entre-temps.
    pub fn load_document(&self, path: &Path) -> Result<Option<Document>> {
        match self.storage.read_document(path) {
            Ok(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::malformed(path, e)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// BASE
// ============================================================================

/// Point d'entrée : une racine de stockage, des modèles nommés, des plugins.
pub struct SymDb {
    config: DbConfig,
    storage: Arc<dyn StorageBackend>,
    pool: IoPool,
    models: RwLock<HashMap<String, Model>>,
    plugins: RwLock<Vec<Arc<dyn Plugin>>>,
}

impl SymDb {
    /// Ouvre (et crée au besoin) la racine avec le backend disque local.
    pub fn open(config: DbConfig) -> Result<Self> {
        let storage = Arc::new(FsStorage::new(config.link_type));
        Self::with_storage(config, storage)
    }

    /// Ouvre la base sur un backend fourni par l'appelant.
    /// Avec un `log_dir` configuré, le logger global est installé au passage.
    pub fn with_storage(config: DbConfig, storage: Arc<dyn StorageBackend>) -> Result<Self> {
        if config.log_dir.is_some() {
            init_logging(LogOptions::from_config(&config));
        }
        fs::ensure_dir(&config.root)?;
        let pool = IoPool::pooled(config.concurrency)?;

        let db = Self {
            storage,
            pool,
            models: RwLock::new(HashMap::new()),
            plugins: RwLock::new(Vec::new()),
            config,
        };

        if db.config.blobs {
            db.register_plugin(Arc::new(BlobPlugin));
        }

        info!(
            root = ?db.config.root,
            link_type = %db.config.link_type,
            concurrency = db.config.concurrency,
            "SymDb ouverte"
        );
        Ok(db)
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Crée (ou remplace) le modèle `name` et y attache les plugins.
    pub fn model(&self, name: &str, schema: Schema) -> Model {
        let model = Model::new(
            name,
            CollectionPaths::new(&self.config.root, name),
            schema,
            self.storage.clone(),
            self.pool.clone(),
        );

        let plugins = self
            .plugins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for plugin in &plugins {
            plugin.attach(&model);
        }

        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), model.clone());

        info!(model = %name, fields = model.schema().len(), "Modèle enregistré");
        model
    }

    pub fn get_model(&self, name: &str) -> Option<Model> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Enregistre un plugin ; il est attaché aux modèles existants et futurs.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) {
        let existing: Vec<Model> = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for model in &existing {
            plugin.attach(model);
        }

        debug!(plugin = plugin.name(), models = existing.len(), "Plugin enregistré");
        self.plugins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(plugin);
    }

    pub fn id(&self) -> String {
        new_id()
    }
}
