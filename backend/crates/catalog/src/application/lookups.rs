//! Category / brand use cases

use std::sync::Arc;

use crate::domain::lookup::{Lookup, LookupKind, lookup_name};
use crate::domain::repository::CatalogRepository;
use crate::error::CatalogResult;

pub struct LookupUseCase<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
    kind: LookupKind,
}

impl<R> LookupUseCase<R>
where
    R: CatalogRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, kind: LookupKind) -> Self {
        Self { repo, kind }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Lookup>> {
        self.repo.list_lookups(self.kind).await
    }

    pub async fn create(&self, name: &str) -> CatalogResult<Lookup> {
        let name = lookup_name(name)?;
        let lookup = self.repo.insert_lookup(self.kind, &name).await?;
        tracing::info!(kind = self.kind.label(), id = lookup.id, name = %lookup.name, "Lookup created");
        Ok(lookup)
    }
}
