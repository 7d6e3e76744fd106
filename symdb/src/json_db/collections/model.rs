// FICHIER : symdb/src/json_db/collections/model.rs

use super::builder::QueryBuilder;
use super::hooks::{
    FnHook, Hook, HookEvent, HookPoint, HookRegistry, Operation, OperationContext, Payload,
};
use crate::json_db::indexes::{self, manager::document_id, CollectionPaths, FieldType, Schema};
use crate::json_db::indexes::{PathKind, ID_FIELD};
use crate::json_db::query::sort::{paginate, sort_documents};
use crate::json_db::query::{index_search, scan_search, Lookup, PageSpec, SortSpec};
use crate::json_db::storage::{IoPool, StorageBackend};
use crate::json_db::{new_id, Document, Scope};
use crate::utils::prelude::*;
use crate::utils::{Arc, RwLock};
use std::fmt;
use std::sync::PoisonError;

/// Une collection nommée : schéma, pipeline d'événements, accès disque.
///
/// Les variantes `*_sync` exécutent chaque étape sur le thread appelant.
/// Les variantes async exécutent le même pipeline via `spawn_blocking`,
/// avec fan-out des appels disque indépendants sur le pool d'I/O.
/// Aucun verrou par document : deux écritures concurrentes du même `_id`
/// se font la course au niveau du système de fichiers.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    name: String,
    paths: CollectionPaths,
    schema: RwLock<Arc<Schema>>,
    hooks: HookRegistry,
    storage: Arc<dyn StorageBackend>,
    pool: IoPool,
}

/// Étapes de recherche demandées à `get`.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryOptions {
    pub sort: Option<SortSpec>,
    pub page: Option<PageSpec>,
}

impl Model {
    pub(crate) fn new(
        name: &str,
        paths: CollectionPaths,
        schema: Schema,
        storage: Arc<dyn StorageBackend>,
        pool: IoPool,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                name: name.to_string(),
                paths,
                schema: RwLock::new(Arc::new(schema)),
                hooks: HookRegistry::default(),
                storage,
                pool,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn paths(&self) -> &CollectionPaths {
        &self.inner.paths
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.inner.storage.as_ref()
    }

    // --- SCHÉMA ---

    /// Instantané du schéma courant.
    pub fn schema(&self) -> Arc<Schema> {
        self.inner
            .schema
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Ajoute un champ indexé et renvoie la nouvelle version du schéma.
    /// Les documents existants n'ont leurs liens qu'après `reindex`.
    pub fn add_field(&self, name: &str, field_type: FieldType) -> u64 {
        let mut guard = self
            .inner
            .schema
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = Schema::clone(&guard);
        let version = next.insert(name, field_type);
        *guard = Arc::new(next);
        info!(model = %self.inner.name, field = %name, version, "Schéma étendu");
        version
    }

    // --- HOOKS ---

    pub fn register_hook(&self, point: HookPoint, hook: Arc<dyn Hook>) {
        self.inner.hooks.register(point, hook);
    }

    /// Enregistre une closure sur un point d'accroche.
    pub fn on<F>(&self, point: HookPoint, handler: F)
    where
        F: Fn(&mut HookEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.register_hook(point, Arc::new(FnHook(handler)));
    }

    fn emit(
        &self,
        point: HookPoint,
        payload: Payload<'_>,
        context: &mut OperationContext,
        io: &IoPool,
    ) -> Result<()> {
        let mut event = HookEvent {
            point,
            model: self,
            payload,
            context,
            io,
        };
        self.inner.hooks.run(&mut event)
    }

    fn scope<'a>(&'a self, schema: &'a Schema, io: &'a IoPool) -> Scope<'a> {
        Scope {
            storage: self.inner.storage.as_ref(),
            paths: &self.inner.paths,
            schema,
            io,
        }
    }

    // =========================================================================
    // PIPELINE (cœur bloquant commun aux deux disciplines)
    // =========================================================================

    pub(crate) fn run_add(
        &self,
        doc: &mut Document,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<()> {
        self.emit(HookPoint::before(Operation::Add), Payload::Document(&mut *doc), ctx, io)?;
        if !doc.contains_key(ID_FIELD) {
            doc.insert(ID_FIELD.to_string(), Value::String(new_id()));
        }
        self.run_save(doc, ctx, io)?;
        self.emit(HookPoint::after(Operation::Add), Payload::Document(&mut *doc), ctx, io)
    }

    pub(crate) fn run_save(
        &self,
        doc: &mut Document,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<()> {
        if !doc.contains_key(ID_FIELD) {
            doc.insert(ID_FIELD.to_string(), Value::String(new_id()));
        }
        self.emit(HookPoint::before(Operation::Save), Payload::Document(&mut *doc), ctx, io)?;

        let id = document_id(doc)?;
        let store = self.inner.paths.resolve(PathKind::Store { id: &id });
        self.inner
            .storage
            .write_document(&store, &Value::Object(doc.clone()))?;

        let schema = self.schema();
        indexes::index(&self.scope(&schema, io), doc)?;
        debug!(model = %self.inner.name, id = %id, "Document enregistré");

        self.emit(HookPoint::after(Operation::Save), Payload::Document(&mut *doc), ctx, io)
    }

    pub(crate) fn run_update(
        &self,
        doc: &mut Document,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<()> {
        self.emit(HookPoint::before(Operation::Update), Payload::Document(&mut *doc), ctx, io)?;

        let id = document_id(doc)?;
        let schema = self.schema();
        // Non atomique : les anciens liens partent avant la réécriture
        indexes::del_indexes(&self.scope(&schema, io), &id)?;
        self.run_save(doc, ctx, io)?;

        self.emit(HookPoint::after(Operation::Update), Payload::Document(&mut *doc), ctx, io)
    }

    pub(crate) fn run_get(
        &self,
        mut lookup: Lookup,
        options: QueryOptions,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<Vec<Document>> {
        self.emit(HookPoint::before(Operation::Get), Payload::Lookup(&mut lookup), ctx, io)?;

        let schema = self.schema();
        let scope = self.scope(&schema, io);
        let use_index = !lookup.is_empty()
            && lookup.keys().all(|k| schema.is_indexed(k))
            && !lookup.needs_scan();
        debug!(
            model = %self.inner.name,
            strategy = if use_index { "index" } else { "scan" },
            keys = lookup.len(),
            "Recherche"
        );

        let mut results = if use_index {
            index_search::search(&scope, &lookup)?
        } else {
            scan_search::search(&scope, &lookup)?
        };

        if let Some(sort) = &options.sort {
            sort_documents(&mut results, sort);
        }
        if let Some(page) = &options.page {
            results = paginate(results, page);
        }

        self.emit(HookPoint::after(Operation::Get), Payload::Results(&mut results), ctx, io)?;
        Ok(results)
    }

    pub(crate) fn run_del(
        &self,
        doc: &mut Document,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<()> {
        self.emit(HookPoint::before(Operation::Delete), Payload::Document(&mut *doc), ctx, io)?;

        let id = document_id(doc)?;
        let schema = self.schema();
        if let Err(e) = indexes::del_indexes(&self.scope(&schema, io), &id) {
            warn!(model = %self.inner.name, id = %id, error = %e, "Suppression des index incomplète");
        }

        let store = self.inner.paths.resolve(PathKind::Store { id: &id });
        self.inner.storage.delete_file(&store)?;
        debug!(model = %self.inner.name, id = %id, "Document supprimé");

        self.emit(HookPoint::after(Operation::Delete), Payload::Document(&mut *doc), ctx, io)
    }

    pub(crate) fn run_reindex(
        &self,
        lookup: Lookup,
        ctx: &mut OperationContext,
        io: &IoPool,
    ) -> Result<usize> {
        let docs = self.run_get(lookup, QueryOptions::default(), ctx, io)?;
        let schema = self.schema();
        let scope = self.scope(&schema, io);

        for doc in &docs {
            let id = document_id(doc)?;
            indexes::del_indexes(&scope, &id)?;
            indexes::index(&scope, doc)?;
        }

        info!(
            model = %self.inner.name,
            documents = docs.len(),
            schema_version = schema.version(),
            "Réindexation terminée"
        );
        Ok(docs.len())
    }

    // =========================================================================
    // API SYNCHRONE
    // =========================================================================

    pub fn add_sync(&self, mut doc: Document) -> Result<Document> {
        self.run_add(&mut doc, &mut OperationContext::new(), &IoPool::Inline)?;
        Ok(doc)
    }

    pub fn save_sync(&self, mut doc: Document) -> Result<Document> {
        self.run_save(&mut doc, &mut OperationContext::new(), &IoPool::Inline)?;
        Ok(doc)
    }

    pub fn update_sync(&self, mut doc: Document) -> Result<Document> {
        self.run_update(&mut doc, &mut OperationContext::new(), &IoPool::Inline)?;
        Ok(doc)
    }

    pub fn get_sync(&self, lookup: Lookup) -> Result<Vec<Document>> {
        self.run_get(
            lookup,
            QueryOptions::default(),
            &mut OperationContext::new(),
            &IoPool::Inline,
        )
    }

    pub fn del_sync(&self, mut doc: Document) -> Result<Document> {
        self.run_del(&mut doc, &mut OperationContext::new(), &IoPool::Inline)?;
        Ok(doc)
    }

    /// Reconstruit les liens des documents qui répondent à `lookup`.
    pub fn reindex_sync(&self, lookup: Lookup) -> Result<usize> {
        self.run_reindex(lookup, &mut OperationContext::new(), &IoPool::Inline)
    }

    // =========================================================================
    // API ASYNCHRONE
    // =========================================================================

    async fn blocking<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Model, &mut OperationContext) -> Result<T> + Send + 'static,
    {
        let model = self.clone();
        tokio::task::spawn_blocking(move || job(&model, &mut OperationContext::new())).await?
    }

    pub async fn add(&self, doc: Document) -> Result<Document> {
        self.blocking(move |m, ctx| {
            let mut doc = doc;
            m.run_add(&mut doc, ctx, &m.inner.pool)?;
            Ok(doc)
        })
        .await
    }

    pub async fn save(&self, doc: Document) -> Result<Document> {
        self.blocking(move |m, ctx| {
            let mut doc = doc;
            m.run_save(&mut doc, ctx, &m.inner.pool)?;
            Ok(doc)
        })
        .await
    }

    pub async fn update(&self, doc: Document) -> Result<Document> {
        self.blocking(move |m, ctx| {
            let mut doc = doc;
            m.run_update(&mut doc, ctx, &m.inner.pool)?;
            Ok(doc)
        })
        .await
    }

    pub async fn get(&self, lookup: Lookup) -> Result<Vec<Document>> {
        self.get_with(lookup, QueryOptions::default()).await
    }

    pub(crate) async fn get_with(
        &self,
        lookup: Lookup,
        options: QueryOptions,
    ) -> Result<Vec<Document>> {
        self.blocking(move |m, ctx| m.run_get(lookup, options, ctx, &m.inner.pool))
            .await
    }

    pub(crate) fn get_sync_with(
        &self,
        lookup: Lookup,
        options: QueryOptions,
    ) -> Result<Vec<Document>> {
        self.run_get(lookup, options, &mut OperationContext::new(), &IoPool::Inline)
    }

    pub async fn del(&self, doc: Document) -> Result<Document> {
        self.blocking(move |m, ctx| {
            let mut doc = doc;
            m.run_del(&mut doc, ctx, &m.inner.pool)?;
            Ok(doc)
        })
        .await
    }

    pub async fn reindex(&self, lookup: Lookup) -> Result<usize> {
        self.blocking(move |m, ctx| m.run_reindex(lookup, ctx, &m.inner.pool))
            .await
    }

    // --- REQUÊTES CHAÎNÉES ---

    /// Tri appliqué à la prochaine recherche de ce builder uniquement.
    pub fn sort(&self, spec: SortSpec) -> QueryBuilder {
        QueryBuilder::new(self.clone()).sort(spec)
    }

    /// Page 1-indexée appliquée à la prochaine recherche de ce builder uniquement.
    pub fn page(&self, page: usize, size: usize) -> QueryBuilder {
        QueryBuilder::new(self.clone()).page(page, size)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field("root", &self.inner.paths.root())
            .field("schema_version", &self.schema().version())
            .finish()
    }
}
