//! Scheduler: runs due tasks against their devices.
//!
//! The scheduler keeps no state between ticks: tasks live in the task
//! repository and devices in the device repository. Something outside this
//! crate (the daemon's ticker, a test) calls [`Scheduler::tick`] once per
//! minute with the current time of day, and the call runs every due task to
//! completion, one after another, before returning. Callers must not overlap
//! ticks.

use homesched_domain::device::Device;
use homesched_domain::error::HomeschedError;
use homesched_domain::id::TaskId;
use homesched_domain::task::Task;
use homesched_domain::time::TimeOfDay;

use crate::ports::{DeviceRepository, TaskRepository};

/// What happened to each due task during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Command applied and device saved.
    pub executed: Vec<TaskId>,
    /// No command, or a command the device's variant does not support.
    pub ignored: Vec<TaskId>,
    /// Device missing or unreadable; task left untouched.
    pub skipped: Vec<TaskId>,
    /// Command applied but saving the device failed.
    pub failed: Vec<TaskId>,
    /// One-shot tasks removed after running.
    pub retired: Vec<TaskId>,
}

impl TickReport {
    /// Number of due tasks whose device resolved, whatever the outcome.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.executed.len() + self.ignored.len() + self.failed.len()
    }

    /// Whether no task was due at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempted() == 0 && self.skipped.is_empty()
    }
}

enum Outcome {
    Executed,
    Ignored,
    Failed,
}

/// Evaluates due tasks on each tick.
pub struct Scheduler<DR, TR> {
    device_repo: DR,
    task_repo: TR,
}

impl<DR, TR> Scheduler<DR, TR>
where
    DR: DeviceRepository,
    TR: TaskRepository,
{
    /// Create a new scheduler.
    pub fn new(device_repo: DR, task_repo: TR) -> Self {
        Self {
            device_repo,
            task_repo,
        }
    }

    /// Run every task whose time is exactly `now`.
    ///
    /// Tasks are handled in listing order. A task whose device cannot be
    /// loaded is skipped and kept. Otherwise its command is applied, the device
    /// is saved, and a one-shot task is deleted, even if saving failed.
    /// Failures are not retried within the tick.
    ///
    /// # Errors
    ///
    /// Returns a storage error only if the task list cannot be loaded.
    /// Failures while handling individual tasks are logged and reported in
    /// the [`TickReport`].
    #[tracing::instrument(skip(self, now), fields(now = %now))]
    pub async fn tick(&self, now: TimeOfDay) -> Result<TickReport, HomeschedError> {
        let tasks = self.task_repo.get_all().await?;
        let mut report = TickReport::default();

        for task in tasks.iter().filter(|task| task.is_due(now)) {
            let Some(device) = self.resolve_device(task).await else {
                report.skipped.push(task.id);
                continue;
            };

            match self.run_task(task, device).await {
                Outcome::Executed => report.executed.push(task.id),
                Outcome::Ignored => report.ignored.push(task.id),
                Outcome::Failed => report.failed.push(task.id),
            }

            if !task.repeat {
                match self.task_repo.delete(task.id).await {
                    Ok(()) => report.retired.push(task.id),
                    Err(err) => {
                        tracing::error!(task_id = %task.id, error = %err, "failed to retire one-shot task");
                    }
                }
            }
        }

        tracing::debug!(
            executed = report.executed.len(),
            ignored = report.ignored.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            retired = report.retired.len(),
            "tick finished"
        );
        Ok(report)
    }

    async fn resolve_device(&self, task: &Task) -> Option<Device> {
        match self.device_repo.get_by_id(task.device_id).await {
            Ok(Some(device)) => Some(device),
            Ok(None) => {
                tracing::debug!(task_id = %task.id, device_id = %task.device_id, "device not found, skipping task");
                None
            }
            Err(err) => {
                tracing::warn!(task_id = %task.id, device_id = %task.device_id, error = %err, "failed to load device, skipping task");
                None
            }
        }
    }

    async fn run_task(&self, task: &Task, mut device: Device) -> Outcome {
        let Some(command) = task.action.command() else {
            tracing::debug!(task_id = %task.id, action = task.action.as_str(), "task action matches no command");
            return Outcome::Ignored;
        };

        if !device.apply(command) {
            tracing::debug!(
                task_id = %task.id,
                command = %command,
                device_type = %device.device_type(),
                "command not supported by device"
            );
            return Outcome::Ignored;
        }

        match self.device_repo.update(device).await {
            Ok(device) => {
                tracing::info!(
                    task_id = %task.id,
                    device_id = %device.id,
                    command = %command,
                    voltage = device.voltage(),
                    "task executed"
                );
                Outcome::Executed
            }
            Err(err) => {
                tracing::error!(task_id = %task.id, device_id = %task.device_id, error = %err, "failed to save device");
                Outcome::Failed
            }
        }
    }
}
