//! Task service: the task store use-cases.

use homesched_domain::command::TaskAction;
use homesched_domain::error::HomeschedError;
use homesched_domain::id::{DeviceId, TaskId};
use homesched_domain::task::{NewTask, Task};

use crate::ports::TaskRepository;

/// Application service for scheduling, listing, and removing tasks.
pub struct TaskService<R> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Schedule `action` on `device_id` at `time` (`HH:MM`).
    ///
    /// The device does not have to exist yet. An action matching no command
    /// is stored anyway and stays inert when the task fires.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::Validation`] when `time` is not a valid
    /// `HH:MM` value, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(
        &self,
        device_id: DeviceId,
        action: &str,
        time: &str,
        repeat: bool,
    ) -> Result<Task, HomeschedError> {
        let task = NewTask::builder()
            .device_id(device_id)
            .action(TaskAction::parse(action))
            .time(time)
            .repeat(repeat)
            .build()?;
        self.schedule(task).await
    }

    /// Store an already validated task draft.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn schedule(&self, task: NewTask) -> Result<Task, HomeschedError> {
        if task.action.command().is_none() {
            tracing::warn!(
                action = task.action.as_str(),
                "action matches no known command, task will have no effect"
            );
        }
        let created = self.repo.create(task).await?;
        tracing::info!(task_id = %created.id, time = %created.time, repeat = created.repeat, "task scheduled");
        Ok(created)
    }

    /// List all tasks in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, HomeschedError> {
        self.repo.get_all().await
    }

    /// Delete a task by id. Deleting an unknown id is not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: TaskId) -> Result<(), HomeschedError> {
        self.repo.delete(id).await
    }
}
