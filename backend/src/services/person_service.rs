//! Logic layer for person records.
//!
//! Each operation derives a child context bounded by the configured request
//! timeout. The child is a [`ScopedContext`](crate::context::ScopedContext)
//! and is released when the operation returns, whatever the outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::error;

use crate::context::Context;
use crate::db::repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

/// Operations the HTTP layer depends on.
#[async_trait]
pub trait PersonLogic: Send + Sync {
    /// All persons, ordered by id.
    async fn get(&self, ctx: &Context) -> RepositoryResult<Vec<Person>>;

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person>;

    /// Store a new person and return the assigned id.
    async fn add(&self, ctx: &Context, person: Person) -> RepositoryResult<PersonId>;

    async fn update(&self, ctx: &Context, person: Person) -> RepositoryResult<()>;

    /// Delete an existing person.
    ///
    /// Fails without touching the store when the person cannot be found.
    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()>;
}

/// [`PersonLogic`] backed by a [`PersonRepository`].
#[derive(Clone)]
pub struct PersonService {
    repo: Arc<dyn PersonRepository>,
    timeout: Duration,
}

impl PersonService {
    pub fn new(repo: Arc<dyn PersonRepository>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }
}

fn logged<T>(operation: &str, result: RepositoryResult<T>) -> RepositoryResult<T> {
    if let Err(ref e) = result {
        error!("event=logic status=error operation={} error={}", operation, e);
    }
    result
}

#[async_trait]
impl PersonLogic for PersonService {
    async fn get(&self, ctx: &Context) -> RepositoryResult<Vec<Person>> {
        let scoped = ctx.with_timeout(self.timeout);
        logged("get", self.repo.list_all(&scoped).await)
    }

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person> {
        let scoped = ctx.with_timeout(self.timeout);
        logged("get_by_id", self.repo.get_by_id(&scoped, id).await)
    }

    async fn add(&self, ctx: &Context, person: Person) -> RepositoryResult<PersonId> {
        let scoped = ctx.with_timeout(self.timeout);
        logged("add", self.repo.add(&scoped, &person).await)
    }

    async fn update(&self, ctx: &Context, person: Person) -> RepositoryResult<()> {
        let scoped = ctx.with_timeout(self.timeout);
        logged("update", self.repo.update(&scoped, &person).await)
    }

    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()> {
        let scoped = ctx.with_timeout(self.timeout);

        let existing = logged("delete", self.repo.get_by_id(&scoped, id).await)?;
        if existing.id.is_unassigned() {
            return logged(
                "delete",
                Err(RepositoryError::not_found_with_context(
                    "person not found",
                    ErrorContext::new("delete")
                        .with_entity("person")
                        .with_entity_id(id),
                )),
            );
        }

        logged("delete", self.repo.delete(&scoped, id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repository that answers every lookup with an unsaved record.
    #[derive(Default)]
    struct ZeroIdRepository {
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl PersonRepository for ZeroIdRepository {
        async fn list_all(&self, _ctx: &Context) -> RepositoryResult<Vec<Person>> {
            Ok(Vec::new())
        }

        async fn get_by_id(&self, _ctx: &Context, _id: PersonId) -> RepositoryResult<Person> {
            Ok(Person::new("a@b.com", "1", "A", "B"))
        }

        async fn add(&self, _ctx: &Context, _person: &Person) -> RepositoryResult<PersonId> {
            Ok(PersonId::new(1))
        }

        async fn update(&self, _ctx: &Context, _person: &Person) -> RepositoryResult<()> {
            Ok(())
        }

        async fn delete(&self, _ctx: &Context, _id: PersonId) -> RepositoryResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delete_treats_zero_id_record_as_missing() {
        let repo = Arc::new(ZeroIdRepository::default());
        let service = PersonService::new(repo.clone(), Duration::from_secs(1));

        let err = service
            .delete(&Context::background(), PersonId::new(5))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.context().operation.as_deref(), Some("delete"));
        assert_eq!(repo.deletes.load(Ordering::SeqCst), 0);
    }
}
