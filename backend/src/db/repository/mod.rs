//! Repository trait for person storage.
//!
//! Implementations translate store results into [`Person`] values or typed
//! [`RepositoryError`]s. Every method takes the caller's [`Context`]; an
//! implementation must stop waiting on the store once that context ends.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::context::Context;
use crate::models::{Person, PersonId};

/// Storage contract for [`Person`] records.
///
/// # Contracts
/// - `list_all` returns records ordered by id ascending; an empty store yields
///   an empty vector.
/// - `get_by_id` fails with [`RepositoryError::NotFound`] when nothing matches.
/// - `add`, `update` and `delete` fail with
///   [`RepositoryError::RowCountMismatch`] unless exactly one row was written.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// All persons, ordered by id.
    async fn list_all(&self, ctx: &Context) -> RepositoryResult<Vec<Person>>;

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person>;

    /// Insert every field except `id` and return the id the store assigned.
    async fn add(&self, ctx: &Context, person: &Person) -> RepositoryResult<PersonId>;

    /// Overwrite all fields of the record identified by `person.id`.
    async fn update(&self, ctx: &Context, person: &Person) -> RepositoryResult<()>;

    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()>;
}
