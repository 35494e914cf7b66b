//! Storage port: repository traits for persistence.
//!
//! Identity is assigned by the repository on `create`. Listings return
//! records in insertion order.

use std::future::Future;
use std::sync::Arc;

use homesched_domain::device::{Device, NewDevice};
use homesched_domain::error::HomeschedError;
use homesched_domain::id::{DeviceId, TaskId};
use homesched_domain::task::{NewTask, Task};

/// Repository for persisting and querying [`Device`]s.
pub trait DeviceRepository {
    /// Store a new device, assigning its identity. It starts powered off.
    fn create(&self, device: NewDevice)
    -> impl Future<Output = Result<Device, HomeschedError>> + Send;

    /// Get a device by its identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeschedError>> + Send;

    /// Get all devices in insertion order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeschedError>> + Send;

    /// Overwrite the stored state of an existing device.
    ///
    /// Fails with [`HomeschedError::NotFound`] when no device has this id.
    fn update(&self, device: Device)
    -> impl Future<Output = Result<Device, HomeschedError>> + Send;
}

/// Repository for persisting and querying [`Task`]s.
pub trait TaskRepository {
    /// Store a new task, assigning its identity.
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, HomeschedError>> + Send;

    /// Get all tasks in insertion order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Task>, HomeschedError>> + Send;

    /// Delete a task. Deleting an absent id succeeds.
    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), HomeschedError>> + Send;
}

impl<T: DeviceRepository + Send + Sync> DeviceRepository for Arc<T> {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        (**self).create(device)
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeschedError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeschedError>> + Send {
        (**self).get_all()
    }

    fn update(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        (**self).update(device)
    }
}

impl<T: TaskRepository + Send + Sync> TaskRepository for Arc<T> {
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, HomeschedError>> + Send {
        (**self).create(task)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Task>, HomeschedError>> + Send {
        (**self).get_all()
    }

    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), HomeschedError>> + Send {
        (**self).delete(id)
    }
}
