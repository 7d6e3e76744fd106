// FICHIER : symdb/src/json_db/collections/mod.rs

//! Modèles (collections) et pipeline d'événements

pub mod builder;
pub mod hooks;
pub mod model;
pub mod patcher;

pub use builder::QueryBuilder;
pub use hooks::{Hook, HookEvent, HookPoint, Operation, OperationContext, Payload, Phase};
pub use model::Model;
pub use patcher::Patcher;
