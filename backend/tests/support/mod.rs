#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use person_service::context::Context;
use person_service::db::repository::{PersonRepository, RepositoryResult};
use person_service::models::{Person, PersonId};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to the process-global
/// environment so parallel tests do not see each other's changes.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn sample_person(n: usize) -> Person {
    Person::new(
        format!("person{}@example.com", n),
        format!("+1-555-{:04}", n),
        format!("First{}", n),
        format!("Last{}", n),
    )
}

/// Per-operation call counters for [`RecordingRepository`].
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_all: AtomicUsize,
    pub get_by_id: AtomicUsize,
    pub add: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.add.load(Ordering::SeqCst)
            + self.update.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.writes() + self.list_all.load(Ordering::SeqCst) + self.get_by_id.load(Ordering::SeqCst)
    }
}

/// Wraps a repository and counts every call that reaches it.
pub struct RecordingRepository<R> {
    inner: R,
    pub calls: Arc<CallCounts>,
}

impl<R> RecordingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: Arc::new(CallCounts::default()),
        }
    }
}

#[async_trait]
impl<R: PersonRepository> PersonRepository for RecordingRepository<R> {
    async fn list_all(&self, ctx: &Context) -> RepositoryResult<Vec<Person>> {
        self.calls.list_all.fetch_add(1, Ordering::SeqCst);
        self.inner.list_all(ctx).await
    }

    async fn get_by_id(&self, ctx: &Context, id: PersonId) -> RepositoryResult<Person> {
        self.calls.get_by_id.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(ctx, id).await
    }

    async fn add(&self, ctx: &Context, person: &Person) -> RepositoryResult<PersonId> {
        self.calls.add.fetch_add(1, Ordering::SeqCst);
        self.inner.add(ctx, person).await
    }

    async fn update(&self, ctx: &Context, person: &Person) -> RepositoryResult<()> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.inner.update(ctx, person).await
    }

    async fn delete(&self, ctx: &Context, id: PersonId) -> RepositoryResult<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(ctx, id).await
    }
}
