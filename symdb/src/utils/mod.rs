// FICHIER : symdb/src/utils/mod.rs

// =========================================================================
//  SYMDB UTILS - Foundation Layer
// =========================================================================

pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod json;
pub mod logger;

// --- FAÇADES SÉMANTIQUES ---

/// **Core Foundation** : Types de base et Erreurs.
pub mod core {
    pub use super::error::{AppError, Result};
    pub use uuid::Uuid;
}

/// **Data Abstraction** : Manipulation JSON.
pub mod data {
    pub use super::json::{
        display_string, get_path, json, merge, parse, set_path, stringify, to_value, Map, Value,
    };
    pub use serde::{Deserialize, Serialize};
    pub use std::collections::{BTreeMap, HashMap, HashSet};
}

/// **Application Context** : Accès Config/Log/Env.
pub mod context {
    pub use super::config::DbConfig;
    pub use super::env::{get, get_or, is_enabled};
    pub use super::logger::{init_logging, LogOptions};
}

/// **Le Prélude** : À utiliser via `use crate::utils::prelude::*;`
pub mod prelude {
    pub use super::context::DbConfig;
    pub use super::core::{AppError, Result, Uuid};
    pub use super::data::{json, Deserialize, Map, Serialize, Value};
    pub use tracing::{debug, error, info, instrument, warn};
}

pub use config::DbConfig;
pub use error::{AppError, Result};
pub use logger::init_logging;

pub use std::sync::{Arc, RwLock};
