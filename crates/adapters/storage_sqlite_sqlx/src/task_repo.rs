//! `SQLite` implementation of [`TaskRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homesched_app::ports::TaskRepository;
use homesched_domain::command::TaskAction;
use homesched_domain::error::HomeschedError;
use homesched_domain::id::{DeviceId, TaskId};
use homesched_domain::task::{NewTask, Task};
use homesched_domain::time::TimeOfDay;

use crate::error::StorageError;

struct Wrapper(Task);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let device_id: i64 = row.try_get("device_id")?;
        let action: String = row.try_get("action")?;
        let time: String = row.try_get("time")?;
        let repeat: bool = row.try_get("repeat")?;

        let time: TimeOfDay = time
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Task {
            id: TaskId::from_raw(id),
            device_id: DeviceId::from_raw(device_id),
            action: TaskAction::parse(action),
            time,
            repeat,
        }))
    }
}

const INSERT: &str = "INSERT INTO tasks (device_id, action, time, repeat) VALUES (?, ?, ?, ?)";
const SELECT_ALL: &str = "SELECT * FROM tasks ORDER BY id";
const DELETE_BY_ID: &str = "DELETE FROM tasks WHERE id = ?";

/// `SQLite`-backed task repository.
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(task.device_id.as_raw())
                .bind(task.action.as_str())
                .bind(task.time.to_string())
                .bind(task.repeat)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Task::from_new(
                TaskId::from_raw(result.last_insert_rowid()),
                task,
            ))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Task>, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            // rows that fail to decode are logged and left out
            let tasks = rows
                .iter()
                .filter_map(|row| match Wrapper::from_row(row) {
                    Ok(Wrapper(task)) => Some(task),
                    Err(err) => {
                        let id: Option<i64> = row.try_get("id").ok();
                        tracing::warn!(task_id = ?id, error = %err, "skipping undecodable task row");
                        None
                    }
                })
                .collect();
            Ok(tasks)
        }
    }

    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.as_raw())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
