// FICHIER : symdb/src/plugins/mod.rs

//! Collaborateurs optionnels branchés sur le pipeline des modèles.

pub mod blobs;

use crate::json_db::collections::Model;

/// Un plugin s'attache à chaque modèle créé par la base
/// en enregistrant ses hooks.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn attach(&self, model: &Model);
}

pub use blobs::BlobPlugin;
