// FICHIER : symdb/src/json_db/storage/pool.rs

//! Fan-out borné des appels disque indépendants d'une même opération.
//!
//! `Inline` exécute séquentiellement sur le thread appelant (API synchrone,
//! première erreur levée immédiatement). `Pooled` répartit sur un pool rayon
//! dont la taille est la fenêtre de concurrence (API asynchrone).
//! Dans les deux cas l'ordre des résultats suit l'ordre des entrées.

use crate::utils::error::anyhow;
use crate::utils::{AppError, Arc, Result};
use rayon::prelude::*;
use std::fmt;

#[derive(Clone)]
pub enum IoPool {
    Inline,
    Pooled(Arc<rayon::ThreadPool>),
}

impl IoPool {
    pub fn pooled(window: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(window.max(1))
            .thread_name(|i| format!("symdb-io-{}", i))
            .build()
            .map_err(|e| AppError::System(anyhow!("Pool d'I/O indisponible : {}", e)))?;
        Ok(IoPool::Pooled(Arc::new(pool)))
    }

    pub fn window(&self) -> usize {
        match self {
            IoPool::Inline => 1,
            IoPool::Pooled(pool) => pool.current_num_threads(),
        }
    }

    /// Applique `f` à chaque élément ; la première erreur interrompt le lot.
    pub fn try_map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        match self {
            IoPool::Inline => items.iter().map(f).collect(),
            IoPool::Pooled(pool) => pool.install(|| items.par_iter().map(f).collect()),
        }
    }
}

impl fmt::Debug for IoPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoPool::Inline => f.write_str("IoPool::Inline"),
            IoPool::Pooled(_) => write!(f, "IoPool::Pooled({})", self.window()),
        }
    }
}
