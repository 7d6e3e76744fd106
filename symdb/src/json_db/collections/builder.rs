// FICHIER : symdb/src/json_db/collections/builder.rs

use super::model::{Model, QueryOptions};
use crate::json_db::query::{Lookup, PageSpec, SortSpec};
use crate::json_db::Document;
use crate::utils::Result;

/// Recherche à usage unique avec tri et/ou pagination.
/// Consommé par `get` : rien ne survit pour la requête suivante.
#[derive(Debug)]
#[must_use = "le builder ne fait rien tant que `get` n'est pas appelé"]
pub struct QueryBuilder {
    model: Model,
    options: QueryOptions,
}

impl QueryBuilder {
    pub(crate) fn new(model: Model) -> Self {
        Self {
            model,
            options: QueryOptions::default(),
        }
    }

    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.options.sort = Some(spec);
        self
    }

    pub fn page(mut self, page: usize, size: usize) -> Self {
        self.options.page = Some(PageSpec::new(page, size));
        self
    }

    pub async fn get(self, lookup: Lookup) -> Result<Vec<Document>> {
        self.model.get_with(lookup, self.options).await
    }

    pub fn get_sync(self, lookup: Lookup) -> Result<Vec<Document>> {
        self.model.get_sync_with(lookup, self.options)
    }
}
