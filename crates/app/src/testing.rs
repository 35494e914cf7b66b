//! In-memory port implementations shared by the unit tests.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use homesched_domain::device::{Device, NewDevice};
use homesched_domain::error::{HomeschedError, NotFoundError};
use homesched_domain::id::{DeviceId, TaskId};
use homesched_domain::task::{NewTask, Task};

use crate::ports::{DeviceRepository, TaskRepository};

fn storage_failure(message: &str) -> HomeschedError {
    HomeschedError::Storage(Box::new(std::io::Error::other(message.to_string())))
}

// ── Devices ────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryDeviceRepo {
    store: Mutex<Vec<Device>>,
    last_id: AtomicI64,
    failing_reads: Mutex<HashSet<DeviceId>>,
    failing_updates: Mutex<HashSet<DeviceId>>,
    updates: Mutex<usize>,
}

impl InMemoryDeviceRepo {
    /// Make `get_by_id(id)` fail with a storage error.
    pub(crate) fn fail_reads_of(&self, id: DeviceId) {
        self.failing_reads.lock().unwrap().insert(id);
    }

    /// Make `update` of `id` fail with a storage error.
    pub(crate) fn fail_updates_of(&self, id: DeviceId) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    /// Number of successful `update` calls.
    pub(crate) fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }

    pub(crate) fn snapshot(&self, id: DeviceId) -> Option<Device> {
        self.store.lock().unwrap().iter().find(|d| d.id == id).cloned()
    }
}

impl DeviceRepository for InMemoryDeviceRepo {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        let mut store = self.store.lock().unwrap();
        let next = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let device = Device::from_new(DeviceId::from_raw(next), device);
        store.push(device.clone());
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeschedError>> + Send {
        let result = if self.failing_reads.lock().unwrap().contains(&id) {
            Err(storage_failure("read failed"))
        } else {
            Ok(self.snapshot(id))
        };
        async { result }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeschedError>> + Send {
        let result = self.store.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn update(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        let result = if self.failing_updates.lock().unwrap().contains(&device.id) {
            Err(storage_failure("write failed"))
        } else {
            let mut store = self.store.lock().unwrap();
            match store.iter_mut().find(|d| d.id == device.id) {
                Some(slot) => {
                    *slot = device.clone();
                    *self.updates.lock().unwrap() += 1;
                    Ok(device)
                }
                None => Err(NotFoundError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into()),
            }
        };
        async { result }
    }
}

// ── Tasks ──────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryTaskRepo {
    store: Mutex<Vec<Task>>,
    last_id: AtomicI64,
    fail_listing: Mutex<bool>,
    failing_deletes: Mutex<HashSet<TaskId>>,
}

impl InMemoryTaskRepo {
    pub(crate) fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    pub(crate) fn fail_deletes_of(&self, id: TaskId) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub(crate) fn snapshot(&self) -> Vec<Task> {
        self.store.lock().unwrap().clone()
    }
}

impl TaskRepository for InMemoryTaskRepo {
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, HomeschedError>> + Send {
        let mut store = self.store.lock().unwrap();
        let next = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let task = Task::from_new(TaskId::from_raw(next), task);
        store.push(task.clone());
        async { Ok(task) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Task>, HomeschedError>> + Send {
        let result = if *self.fail_listing.lock().unwrap() {
            Err(storage_failure("list failed"))
        } else {
            Ok(self.snapshot())
        };
        async { result }
    }

    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), HomeschedError>> + Send {
        let result = if self.failing_deletes.lock().unwrap().contains(&id) {
            Err(storage_failure("delete failed"))
        } else {
            self.store.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        };
        async { result }
    }
}
