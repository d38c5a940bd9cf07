//! In-memory local repository implementation.
//!
//! Suitable for unit tests and local development. Records live in a
//! `BTreeMap` keyed by id, so listing is naturally ordered. The write
//! contracts match the SQLite repository: a write that touches no record is a
//! [`RepositoryError::RowCountMismatch`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use parking_lot::RwLock;

use crate::context::Context;
use crate::db::repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

/// In-memory person repository.
///
/// # Example
/// ```
/// use person_service::context::Context;
/// use person_service::db::repositories::LocalRepository;
/// use person_service::db::repository::PersonRepository;
/// use person_service::models::Person;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     let ctx = Context::background();
///     let id = repo.add(&ctx, &Person::new("a@b.com", "1", "Ada", "L")).await.unwrap();
///     assert_eq!(repo.get_by_id(&ctx, id).await.unwrap().first_name, "Ada");
/// });
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    latency: Option<Duration>,
}

struct LocalData {
    persons: BTreeMap<PersonId, Person>,
    next_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            persons: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before touching the data.
    ///
    /// The delay honours the caller's context, so a latency longer than the
    /// request deadline surfaces as a timeout.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent operation fail with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    pub fn len(&self) -> usize {
        self.data.read().persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait out the configured latency and check store health.
    async fn enter(&self, ctx: &Context, operation: &str) -> RepositoryResult<()> {
        let waited = match self.latency {
            Some(latency) => ctx.run(tokio::time::sleep(latency)).await,
            None => ctx.err().map_or(Ok(()), Err),
        };
        if let Err(ctx_err) = waited {
            let err = RepositoryError::from(ctx_err).with_operation(operation);
            error!("event=repository status=error backend=local error={}", err);
            return Err(err);
        }

        if !self.data.read().is_healthy {
            let err = RepositoryError::connection_with_context(
                "local store marked unhealthy",
                ErrorContext::new(operation),
            );
            error!("event=repository status=error backend=local error={}", err);
            return Err(err);
        }
        Ok(())
    }
}

fn log_failure<T>(result: RepositoryResult<T>) -> RepositoryResult<T> {
    if let Err(ref e) = result {
        error!("event=repository status=error backend=local error={}", e);
    }
    result
}

#[async_trait]
impl PersonRepository for LocalRepository {
    async fn list_all(&self, ctx: &Context) -> RepositoryResult<Vec<Person>> {
        self.enter(ctx, "list_all").await?;
        Ok(self.data.read().persons.values().cloned().collect())
    }

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person> {
        self.enter(ctx, "get_by_id").await?;
        let found = self.data.read().persons.get(&id).cloned();
        log_failure(found.ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "person not found",
                ErrorContext::new("get_by_id")
                    .with_entity("person")
                    .with_entity_id(id),
            )
        }))
    }

    async fn add(&self, ctx: &Context, person: &Person) -> RepositoryResult<PersonId> {
        self.enter(ctx, "add").await?;
        let mut data = self.data.write();
        let id = PersonId::new(data.next_id);
        data.next_id += 1;
        data.persons.insert(id, person.clone().with_id(id));
        Ok(id)
    }

    async fn update(&self, ctx: &Context, person: &Person) -> RepositoryResult<()> {
        self.enter(ctx, "update").await?;
        let mut data = self.data.write();
        let result = match data.persons.get_mut(&person.id) {
            Some(stored) => {
                *stored = person.clone();
                Ok(())
            }
            None => Err(RepositoryError::row_count(
                0,
                ErrorContext::new("update")
                    .with_entity("person")
                    .with_entity_id(person.id),
            )),
        };
        log_failure(result)
    }

    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()> {
        self.enter(ctx, "delete").await?;
        let removed = self.data.write().persons.remove(&id);
        log_failure(removed.map(|_| ()).ok_or_else(|| {
            RepositoryError::row_count(
                0,
                ErrorContext::new("delete")
                    .with_entity("person")
                    .with_entity_id(id),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = LocalRepository::new();
        let ctx = Context::background();
        let first = repo.add(&ctx, &Person::new("a", "1", "A", "A")).await.unwrap();
        let second = repo.add(&ctx, &Person::new("b", "2", "B", "B")).await.unwrap();
        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        repo.clear();
        let err = repo.list_all(&Context::background()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_latency_longer_than_deadline_times_out() {
        let repo = LocalRepository::new().with_latency(Duration::from_secs(10));
        let parent = Context::background();
        let scoped = parent.with_timeout(Duration::from_millis(20));
        let err = repo.list_all(&scoped).await.unwrap_err();
        assert!(err.is_deadline());
        assert_eq!(err.context().operation.as_deref(), Some("list_all"));
    }
}
