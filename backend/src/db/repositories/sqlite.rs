//! SQLite implementation of [`PersonRepository`] using rusqlite.
//!
//! One connection is opened at startup and shared by every request behind a
//! mutex. Statements run on the blocking pool; when the caller's context ends
//! first, the in-flight statement is interrupted through the connection's
//! [`InterruptHandle`] and the caller gets a timeout or cancellation error.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};
use parking_lot::Mutex;
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension, Row};
use tokio::task;

use crate::context::Context;
use crate::db::repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

const CREATE_PERSON_TABLE: &str = "CREATE TABLE IF NOT EXISTS Person (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL
)";

const SELECT_ALL: &str = "SELECT * FROM Person ORDER BY id";
const SELECT_BY_ID: &str = "SELECT * FROM Person WHERE id = ?1";
const INSERT: &str = "INSERT INTO Person (email, phone, firstname, lastname) VALUES (?1, ?2, ?3, ?4)";
const UPDATE: &str =
    "UPDATE Person SET email = ?1, phone = ?2, firstname = ?3, lastname = ?4 WHERE id = ?5";
const DELETE: &str = "DELETE FROM Person WHERE id = ?1";

/// Tracks which call currently owns the connection so an abandoned call can
/// interrupt its own statement and nobody else's.
struct ActiveCall {
    owner: Mutex<Option<u64>>,
    handle: InterruptHandle,
}

/// SQLite-backed person repository.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
    active: Arc<ActiveCall>,
    next_call: Arc<AtomicU64>,
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRepository")
            .field("active_call", &*self.active.owner.lock())
            .finish_non_exhaustive()
    }
}

impl SqliteRepository {
    /// Wrap a shared connection, creating the `Person` table if it is missing.
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let handle = {
            let guard = conn.lock();
            guard.execute_batch(CREATE_PERSON_TABLE).map_err(|e| {
                error!("event=schema_bootstrap status=error error={}", e);
                RepositoryError::from(e).with_operation("bootstrap_schema")
            })?;
            guard.get_interrupt_handle()
        };

        Ok(Self {
            conn,
            active: Arc::new(ActiveCall {
                owner: Mutex::new(None),
                handle,
            }),
            next_call: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            error!(
                "event=db_open status=error path={} error={}",
                path.display(),
                e
            );
            RepositoryError::connection_with_context(
                e.to_string(),
                ErrorContext::new("open").with_details(format!("path={}", path.display())),
            )
        })?;
        debug!("event=db_open status=ok path={}", path.display());
        Self::new(Arc::new(Mutex::new(conn)))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            error!("event=db_open status=error mode=memory error={}", e);
            RepositoryError::connection_with_context(e.to_string(), ErrorContext::new("open"))
        })?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    /// Run `f` against the connection on the blocking pool, bounded by `ctx`.
    async fn with_conn<T, F>(&self, ctx: &Context, operation: &str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> RepositoryResult<T> + Send + 'static,
    {
        if let Some(err) = ctx.err() {
            return Err(RepositoryError::from(err).with_operation(operation));
        }

        let call_id = self.next_call.fetch_add(1, Ordering::Relaxed);
        let abandoned = Arc::new(AtomicBool::new(false));

        let conn = Arc::clone(&self.conn);
        let active = Arc::clone(&self.active);
        let flag = Arc::clone(&abandoned);
        let handle = task::spawn_blocking(move || {
            let conn = conn.lock();
            *active.owner.lock() = Some(call_id);
            let result = if flag.load(Ordering::Acquire) {
                Err(RepositoryError::cancelled("abandoned before execution"))
            } else {
                f(&conn)
            };
            *active.owner.lock() = None;
            result
        });

        let guard = InterruptOnDrop {
            call_id,
            abandoned,
            active: Arc::clone(&self.active),
            armed: true,
        };

        match ctx.run(handle).await {
            Ok(joined) => {
                guard.disarm();
                joined
                    .map_err(|e| {
                        RepositoryError::internal_with_context(
                            format!("Task join error: {}", e),
                            ErrorContext::new("spawn_blocking"),
                        )
                    })?
                    .map_err(|e| e.with_operation(operation))
            }
            Err(ctx_err) => {
                drop(guard);
                Err(RepositoryError::from(ctx_err).with_operation(operation))
            }
        }
    }
}

/// Interrupts the owning call's statement unless disarmed first.
struct InterruptOnDrop {
    call_id: u64,
    abandoned: Arc<AtomicBool>,
    active: Arc<ActiveCall>,
    armed: bool,
}

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.abandoned.store(true, Ordering::Release);
        let owner = self.active.owner.lock();
        if *owner == Some(self.call_id) {
            debug!("event=interrupt call_id={}", self.call_id);
            self.active.handle.interrupt();
        }
    }
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: PersonId::new(row.get(0)?),
        email: row.get(1)?,
        phone: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
    })
}

fn expect_single_row(
    affected: usize,
    operation: &str,
    id: Option<PersonId>,
) -> RepositoryResult<()> {
    if affected == 1 {
        return Ok(());
    }
    let mut context = ErrorContext::new(operation).with_entity("person");
    if let Some(id) = id {
        context = context.with_entity_id(id);
    }
    Err(RepositoryError::row_count(affected, context))
}

fn log_failure<T>(result: RepositoryResult<T>) -> RepositoryResult<T> {
    if let Err(ref e) = result {
        error!("event=repository status=error backend=sqlite error={}", e);
    }
    result
}

#[async_trait]
impl PersonRepository for SqliteRepository {
    async fn list_all(&self, ctx: &Context) -> RepositoryResult<Vec<Person>> {
        let result = self
            .with_conn(ctx, "list_all", |conn| {
                let mut stmt = conn.prepare(SELECT_ALL)?;
                let persons = stmt
                    .query_map([], row_to_person)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(persons)
            })
            .await;
        log_failure(result)
    }

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person> {
        let result = self
            .with_conn(ctx, "get_by_id", move |conn| {
                conn.query_row(SELECT_BY_ID, params![id.value()], row_to_person)
                    .optional()?
                    .ok_or_else(|| {
                        RepositoryError::not_found_with_context(
                            "person not found",
                            ErrorContext::new("get_by_id")
                                .with_entity("person")
                                .with_entity_id(id),
                        )
                    })
            })
            .await;
        log_failure(result)
    }

    async fn add(&self, ctx: &Context, person: &Person) -> RepositoryResult<PersonId> {
        let person = person.clone();
        let result = self
            .with_conn(ctx, "add", move |conn| {
                let affected = conn.execute(
                    INSERT,
                    params![
                        person.email,
                        person.phone,
                        person.first_name,
                        person.last_name
                    ],
                )?;
                expect_single_row(affected, "add", None)?;
                Ok(PersonId::new(conn.last_insert_rowid()))
            })
            .await;
        log_failure(result)
    }

    async fn update(&self, ctx: &Context, person: &Person) -> RepositoryResult<()> {
        let person = person.clone();
        let result = self
            .with_conn(ctx, "update", move |conn| {
                let affected = conn.execute(
                    UPDATE,
                    params![
                        person.email,
                        person.phone,
                        person.first_name,
                        person.last_name,
                        person.id.value()
                    ],
                )?;
                expect_single_row(affected, "update", Some(person.id))
            })
            .await;
        log_failure(result)
    }

    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()> {
        let result = self
            .with_conn(ctx, "delete", move |conn| {
                let affected = conn.execute(DELETE, params![id.value()])?;
                expect_single_row(affected, "delete", Some(id))
            })
            .await;
        log_failure(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const ENDLESS_QUERY: &str = "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) \
                                 SELECT count(*) FROM c";

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let ctx = Context::background();

        let first = SqliteRepository::new(Arc::clone(&conn)).unwrap();
        let id = first
            .add(&ctx, &Person::new("a@b.com", "1", "A", "B"))
            .await
            .unwrap();

        let second = SqliteRepository::new(conn).unwrap();
        assert_eq!(second.get_by_id(&ctx, id).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_deadline_interrupts_running_statement() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let parent = Context::background();
        let scoped = parent.with_timeout(Duration::from_millis(50));

        let result = repo
            .with_conn(&scoped, "endless", |conn| {
                let n: i64 = conn.query_row(ENDLESS_QUERY, [], |row| row.get(0))?;
                Ok(n)
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RepositoryError::TimeoutError { .. }));
        assert_eq!(err.context().operation.as_deref(), Some("endless"));

        // The interrupted statement released the connection.
        let persons = tokio::time::timeout(Duration::from_secs(5), repo.list_all(&parent))
            .await
            .expect("connection stayed busy after interrupt")
            .unwrap();
        assert!(persons.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_never_reaches_store() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let ctx = Context::background();
        ctx.cancel();

        let err = repo
            .add(&ctx, &Person::new("a@b.com", "1", "A", "B"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Cancelled { .. }));

        let persons = repo.list_all(&Context::background()).await.unwrap();
        assert!(persons.is_empty());
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_row_count_mismatch() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let ghost = Person::new("a@b.com", "1", "A", "B").with_id(PersonId::new(42));

        let err = repo
            .update(&Context::background(), &ghost)
            .await
            .unwrap_err();
        match err {
            RepositoryError::RowCountMismatch {
                expected,
                actual,
                context,
            } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
                assert_eq!(context.entity_id.as_deref(), Some("42"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
