use redb::{Database, ReadableTable, TableDefinition};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{register_request::RegisterRequest, settings::DefaultUserSettings, task::Task, user::User};

const USERS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
const EMAIL_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("email_index");
// Keyed by owner id followed by task id, so every lookup is owner-scoped.
const TASKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cannot create default user: {0}")]
    Seed(String),
}

macro_rules! storage_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for StoreError {
                fn from(e: $source) -> Self {
                    StoreError::Storage(e.into())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

fn task_key(owner: Uuid, id: Uuid) -> [u8; 32] {
    owner_key(owner, *id.as_bytes())
}

fn owner_key(owner: Uuid, suffix: [u8; 16]) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(owner.as_bytes());
    key[16..].copy_from_slice(&suffix);
    key
}

#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>
}

impl DataContext {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(TASKS_TABLE)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
        }
        write_txn.commit()?;
        Ok(DataContext { db: Arc::new(db)})
    }

    // USERS
    /// Insert a user, failing with `Conflict` when the email is taken.
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            if email_index.get(user.email.as_str())?.is_some() {
                return Err(StoreError::Conflict("User already exists".to_string()));
            }
            let user_bytes = serde_json::to_vec(user)?;
            let id_bytes = user.id.as_bytes();
            users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
            email_index.insert(user.email.as_str(), id_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users_table = read_txn.open_table(USERS_TABLE)?;
        let id_bytes = id.as_bytes();
        match users_table.get(id_bytes.as_slice())? {
            Some(data) => Ok(Some(serde_json::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let email_index = read_txn.open_table(EMAIL_INDEX)?;

        let normalized = User::normalize_email(email);
        match email_index.get(normalized.as_str())? {
            Some(id_data) => {
                let users_table = read_txn.open_table(USERS_TABLE)?;
                match users_table.get(id_data.value())? {
                    Some(user_data) => Ok(Some(serde_json::from_slice(user_data.value())?)),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    pub fn has_users(&self) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users_table = read_txn.open_table(USERS_TABLE)?;
        let first = users_table.first()?;
        Ok(first.is_some())
    }

    /// Seed the configured account into an empty database. Returns true when
    /// a user was created.
    pub fn ensure_default_user(&self, defaults: Option<&DefaultUserSettings>) -> Result<bool, StoreError> {
        let Some(defaults) = defaults else { return Ok(false) };
        if self.has_users()? {
            return Ok(false);
        }

        let default_user_creation_request = RegisterRequest {
            name: defaults.name.clone(),
            email: defaults.email.clone(),
            password: defaults.password.clone(),
        };
        let default_user = User::new(default_user_creation_request)
            .map_err(|e| StoreError::Seed(e.to_string()))?;
        self.create_user(&default_user)?;
        info!(email = %default_user.email, "created default user");
        Ok(true)
    }

    // TASKS
    pub fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let task_bytes = serde_json::to_vec(task)?;
            let key = task_key(task.user, task.id);
            tasks_table.insert(key.as_slice(), task_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let key = task_key(owner, id);
        match tasks_table.get(key.as_slice())? {
            Some(data) => Ok(Some(serde_json::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// All tasks owned by `owner`, in creation order.
    pub fn list_tasks(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let lower = owner_key(owner, [0x00; 16]);
        let upper = owner_key(owner, [0xff; 16]);

        let mut tasks = Vec::new();
        for entry in tasks_table.range::<&[u8]>(lower.as_slice()..=upper.as_slice())? {
            let (_, value) = entry?;
            let task: Task = serde_json::from_slice(value.value())?;
            tasks.push(task);
        }

        tasks.sort_by_key(|task| task.created_at);
        Ok(tasks)
    }

    /// Overwrite an existing task. Returns false when the owner has no task
    /// with that id.
    pub fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let updated;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let key = task_key(task.user, task.id);
            updated = tasks_table.get(key.as_slice())?.is_some();
            if updated {
                let task_bytes = serde_json::to_vec(task)?;
                tasks_table.insert(key.as_slice(), task_bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(updated)
    }

    pub fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let key = task_key(owner, id);
            deleted = tasks_table.remove(key.as_slice())?.is_some();
        }
        write_txn.commit()?;
        Ok(deleted)
    }
}
