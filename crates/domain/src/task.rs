//! Task: a command scheduled against a device at a time of day.

use serde::{Deserialize, Serialize};

use crate::command::TaskAction;
use crate::error::{HomeschedError, ValidationError};
use crate::id::{DeviceId, TaskId};
use crate::time::TimeOfDay;

/// A stored task.
///
/// `device_id` is not required to resolve: a task pointing at a missing
/// device is legal to keep and simply never runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub device_id: DeviceId,
    pub action: TaskAction,
    pub time: TimeOfDay,
    /// Recurring tasks fire every day; one-shot tasks are removed after firing.
    pub repeat: bool,
}

impl Task {
    /// Attach storage-assigned identity to a draft.
    #[must_use]
    pub fn from_new(id: TaskId, new: NewTask) -> Self {
        Self {
            id,
            device_id: new.device_id,
            action: new.action,
            time: new.time,
            repeat: new.repeat,
        }
    }

    /// Whether the task fires at `now`. Only an exact minute match counts.
    #[must_use]
    pub fn is_due(&self, now: TimeOfDay) -> bool {
        self.time == now
    }
}

/// A task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub device_id: DeviceId,
    pub action: TaskAction,
    pub time: TimeOfDay,
    pub repeat: bool,
}

impl NewTask {
    /// Create a builder for constructing a [`NewTask`].
    #[must_use]
    pub fn builder() -> NewTaskBuilder {
        NewTaskBuilder::default()
    }
}

/// Step-by-step builder for [`NewTask`].
///
/// The time may be given as text; it is validated in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct NewTaskBuilder {
    device_id: Option<DeviceId>,
    action: Option<TaskAction>,
    time: Option<String>,
    repeat: bool,
}

impl NewTaskBuilder {
    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<TaskAction>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    #[must_use]
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Consume the builder, validate, and return a [`NewTask`].
    ///
    /// A missing action yields an inert task (empty text, no command).
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::Validation`] when the device id is missing
    /// or the time is missing or not `HH:MM`.
    pub fn build(self) -> Result<NewTask, HomeschedError> {
        let device_id = self.device_id.ok_or(ValidationError::MissingDeviceId)?;
        let time = self.time.unwrap_or_default().parse::<TimeOfDay>()?;
        Ok(NewTask {
            device_id,
            action: self.action.unwrap_or_else(|| TaskAction::parse("")),
            time,
            repeat: self.repeat,
        })
    }
}
