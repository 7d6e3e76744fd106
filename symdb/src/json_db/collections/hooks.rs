// FICHIER : symdb/src/json_db/collections/hooks.rs

//! Pipeline d'événements typé autour des opérations d'un modèle.
//!
//! Les handlers d'un point s'exécutent dans l'ordre d'enregistrement.
//! La première erreur arrête la chaîne et devient le résultat de l'opération.

use super::model::Model;
use crate::json_db::query::Lookup;
use crate::json_db::storage::IoPool;
use crate::json_db::Document;
use crate::utils::data::{HashMap, Map, Value};
use crate::utils::{Arc, Result, RwLock};
use std::fmt;
use std::sync::PoisonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Save,
    Update,
    Get,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

/// Point d'accroche : une opération et une phase (`save:before`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookPoint {
    pub operation: Operation,
    pub phase: Phase,
}

impl HookPoint {
    pub const fn before(operation: Operation) -> Self {
        Self {
            operation,
            phase: Phase::Before,
        }
    }

    pub const fn after(operation: Operation) -> Self {
        Self {
            operation,
            phase: Phase::After,
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operation {
            Operation::Add => "add",
            Operation::Save => "save",
            Operation::Update => "update",
            Operation::Get => "get",
            Operation::Delete => "delete",
        };
        let phase = match self.phase {
            Phase::Before => "before",
            Phase::After => "after",
        };
        write!(f, "{}:{}", op, phase)
    }
}

/// Contexte d'une opération publique, partagé par ses handlers `before`/`after`
/// et par les opérations imbriquées qu'elle déclenche (add -> save, update -> save).
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    stash: Map<String, Value>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.stash.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.stash.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.stash.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stash.contains_key(key)
    }
}

/// Donnée en vol exposée aux handlers.
pub enum Payload<'a> {
    Document(&'a mut Document),
    Lookup(&'a mut Lookup),
    Results(&'a mut Vec<Document>),
}

pub struct HookEvent<'a> {
    pub point: HookPoint,
    pub model: &'a Model,
    pub payload: Payload<'a>,
    pub context: &'a mut OperationContext,
    pub(crate) io: &'a IoPool,
}

impl HookEvent<'_> {
    pub fn document(&mut self) -> Option<&mut Document> {
        match &mut self.payload {
            Payload::Document(doc) => Some(&mut **doc),
            _ => None,
        }
    }

    pub fn lookup(&mut self) -> Option<&mut Lookup> {
        match &mut self.payload {
            Payload::Lookup(lookup) => Some(&mut **lookup),
            _ => None,
        }
    }

    pub fn results(&mut self) -> Option<&mut Vec<Document>> {
        match &mut self.payload {
            Payload::Results(results) => Some(&mut **results),
            _ => None,
        }
    }
}

/// Un handler : `Ok(())` pour continuer, `Err` pour interrompre l'opération.
pub trait Hook: Send + Sync {
    fn handle(&self, event: &mut HookEvent<'_>) -> Result<()>;
}

/// Adaptateur pour les closures (`model.on(...)`).
pub(crate) struct FnHook<F>(pub(crate) F);

impl<F> Hook for FnHook<F>
where
    F: Fn(&mut HookEvent<'_>) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &mut HookEvent<'_>) -> Result<()> {
        (self.0)(event)
    }
}

// --- REGISTRE ---

#[derive(Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<HookPoint, Vec<Arc<dyn Hook>>>>,
}

impl HookRegistry {
    pub fn register(&self, point: HookPoint, hook: Arc<dyn Hook>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(point)
            .or_default()
            .push(hook);
    }

    /// Copie de la liste : aucun verrou n'est tenu pendant l'exécution.
    pub fn snapshot(&self, point: HookPoint) -> Vec<Arc<dyn Hook>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&point)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count(&self, point: HookPoint) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&point)
            .map_or(0, Vec::len)
    }

    /// Exécute la chaîne ; la première erreur est renvoyée telle quelle.
    pub fn run(&self, event: &mut HookEvent<'_>) -> Result<()> {
        for hook in self.snapshot(event.point) {
            hook.handle(event)?;
        }
        Ok(())
    }
}
