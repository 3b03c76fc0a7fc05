// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides the persistent implementation of:
//! - Users (`users/u_{base64url username}`)
//! - Todos (`todos/{id}`)
//! - Id counters (`counters/{kind}`)

use crate::db::{collections, ensure_author, TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTodo, Todo, TodoPatch, User};
use crate::time_utils::now_micros;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use firestore::{FirestoreConsistencySelector, FirestoreTransaction, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const TODO_COUNTER: &str = "todos";
const USER_COUNTER: &str = "users";

/// Commits that lose a race are retried from a fresh read.
const MAX_COMMIT_ATTEMPTS: u32 = 8;
const RETRY_STEP: Duration = Duration::from_millis(25);

/// Document id for a username. Usernames are arbitrary strings, but
/// document ids may not contain `/`, be `.` or `..`, or match `__.*__`.
/// The prefix and the URL-safe alphabet rule all of those out.
fn user_doc_id(username: &str) -> String {
    format!("u_{}", URL_SAFE_NO_PAD.encode(username))
}

/// Next value handed out by a counter document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Counter {
    next: u64,
}

/// Per-record locks serializing check-then-write on one todo.
type RecordLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
    /// Serializes id allocation within this process. Other processes are
    /// caught by the transaction instead.
    counter_lock: Arc<Mutex<()>>,
    record_locks: RecordLocks,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self::with_client(client))
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self::with_client(client))
    }

    fn with_client(client: firestore::FirestoreDb) -> Self {
        Self {
            client,
            counter_lock: Arc::new(Mutex::new(())),
            record_locks: Arc::new(DashMap::new()),
        }
    }

    fn record_lock(&self, id: u64) -> Arc<Mutex<()>> {
        self.record_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ─── Transactions ────────────────────────────────────────────

    /// A client whose reads run inside `transaction`, so the commit fails
    /// if anything read through it changed in the meantime.
    fn transaction_view(&self, transaction: &FirestoreTransaction<'_>) -> firestore::FirestoreDb {
        self.client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
    }

    async fn begin(&self) -> Result<FirestoreTransaction<'_>, AppError> {
        self.client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    /// Read a counter inside `transaction` and queue its increment.
    /// Ids start at 1.
    async fn reserve_id(
        &self,
        view: &firestore::FirestoreDb,
        transaction: &mut FirestoreTransaction<'_>,
        counter: &str,
    ) -> Result<u64, AppError> {
        let current: Option<Counter> = view
            .fluent()
            .select()
            .by_id_in(collections::COUNTERS)
            .obj()
            .one(counter)
            .await
            .map_err(db_err)?;

        let id = current.map(|c| c.next).unwrap_or(1);

        self.client
            .fluent()
            .update()
            .in_col(collections::COUNTERS)
            .document_id(counter)
            .object(&Counter { next: id + 1 })
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add counter to transaction: {}", e))
            })?;

        Ok(id)
    }

    /// Queue the creation of a new document. The write carries an
    /// `Exists(false)` precondition, so the commit fails instead of
    /// overwriting a document that is already there.
    fn create_in_transaction<T: Serialize + for<'de> Deserialize<'de> + Sync + Send>(
        &self,
        transaction: &mut FirestoreTransaction<'_>,
        collection: &str,
        document_id: String,
        object: &T,
    ) -> Result<(), AppError> {
        self.client
            .fluent()
            .update()
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(document_id)
            .object(object)
            .add_to_transaction(transaction)
            .map_err(|e| AppError::Database(format!("Failed to add create to transaction: {}", e)))?;
        Ok(())
    }

    // ─── Todo Helpers ────────────────────────────────────────────

    async fn get_todo(&self, id: u64) -> Result<Option<Todo>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TODOS)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(db_err)
    }

    /// Overwrite an existing todo. Fails if it was deleted meanwhile.
    async fn put_todo(&self, todo: &Todo) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TODOS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(todo.id.to_string())
            .object(todo)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for FirestoreDb {
    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, AppError> {
        let _guard = self.counter_lock.lock().await;

        let mut attempt = 1;
        loop {
            let mut transaction = self.begin().await?;
            let view = self.transaction_view(&transaction);

            let id = self.reserve_id(&view, &mut transaction, TODO_COUNTER).await?;
            let todo = new.clone().into_todo(id);
            self.create_in_transaction(&mut transaction, collections::TODOS, id.to_string(), &todo)?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(todo_id = id, author = %todo.author, "Todo stored");
                    return Ok(todo);
                }
                Err(e) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "Todo insert conflicted, retrying");
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::Database(format!(
                        "Transaction commit failed: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TODOS)
            .order_by([
                ("created_at", firestore::FirestoreQueryDirection::Descending),
                ("id", firestore::FirestoreQueryDirection::Descending),
            ])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    async fn update_todo(
        &self,
        id: u64,
        author: &str,
        patch: TodoPatch,
    ) -> Result<Todo, AppError> {
        let lock = self.record_lock(id);
        let _guard = lock.lock().await;

        let mut todo = self.get_todo(id).await?.ok_or_else(AppError::todo_not_found)?;
        ensure_author(&todo, author)?;
        patch.apply(&mut todo);
        self.put_todo(&todo).await?;
        Ok(todo)
    }

    async fn delete_todo(&self, id: u64, author: &str) -> Result<Todo, AppError> {
        let lock = self.record_lock(id);
        let guard = lock.lock().await;

        let todo = self.get_todo(id).await?.ok_or_else(AppError::todo_not_found)?;
        ensure_author(&todo, author)?;

        self.client
            .fluent()
            .delete()
            .from(collections::TODOS)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(db_err)?;

        drop(guard);
        self.record_locks.remove(&id);

        tracing::debug!(todo_id = id, "Todo deleted");
        Ok(todo)
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let _guard = self.counter_lock.lock().await;

        let mut attempt = 1;
        loop {
            let mut transaction = self.begin().await?;
            let view = self.transaction_view(&transaction);

            let existing: Option<User> = view
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(&user_doc_id(username))
                .await
                .map_err(db_err)?;
            if existing.is_some() {
                let _ = transaction.rollback().await;
                return Err(AppError::UsernameTaken);
            }

            let user = User {
                id: self.reserve_id(&view, &mut transaction, USER_COUNTER).await?,
                username: username.to_string(),
                password: password.to_string(),
                created_at: now_micros(),
            };
            self.create_in_transaction(
                &mut transaction,
                collections::USERS,
                user_doc_id(username),
                &user,
            )?;

            match transaction.commit().await {
                Ok(_) => return Ok(user),
                // The next attempt sees the winner and reports the name as taken
                Err(e) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "User insert conflicted, retrying");
                    tokio::time::sleep(RETRY_STEP * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::Database(format!(
                        "Transaction commit failed: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_doc_id(username))
            .await
            .map_err(db_err)
    }
}
