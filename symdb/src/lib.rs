// FICHIER : symdb/src/lib.rs

//! SymDb : base documentaire JSON embarquée.
//!
//! Chaque document est un fichier `store/<id>.json` ; chaque valeur de champ
//! indexé devient une entrée `index/<champ>/<valeur>/<id>` (lien symbolique,
//! lien physique ou fichier vide). Les recherches sur champs indexés croisent
//! ces dossiers ; les autres parcourent le store.

pub mod json_db;
pub mod plugins;
pub mod utils;

pub use json_db::collections::{
    Hook, HookEvent, HookPoint, Model, Operation, OperationContext, Patcher, Payload, Phase,
    QueryBuilder,
};
pub use json_db::indexes::{FieldType, Schema};
pub use json_db::query::comparison::{
    between, compare, contains, gt, gte, is_null, is_undefined, lt, lte, starts_with, Comparison,
};
pub use json_db::query::{Criterion, Lookup, PageSpec, SortOrder, SortSpec};
pub use json_db::storage::{FsStorage, LinkType, StorageBackend};
pub use json_db::{Document, SymDb};
pub use plugins::{BlobPlugin, Plugin};
pub use utils::config::DbConfig;
pub use utils::error::{AppError, Result};
pub use utils::logger::{init_logging, LogOptions};
