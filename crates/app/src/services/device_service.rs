//! Device service: the device registry use-cases.

use homesched_domain::command::Command;
use homesched_domain::device::{Device, NewDevice};
use homesched_domain::error::{HomeschedError, NotFoundError};
use homesched_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// Application service for creating, fetching, listing, and saving devices.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new device after validating domain invariants.
    ///
    /// The device starts powered off with zero voltage.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name, device_type = %device.kind.device_type()))]
    pub async fn create_device(&self, device: NewDevice) -> Result<Device, HomeschedError> {
        device.validate()?;
        let created = self.repo.create(device).await?;
        tracing::info!(device_id = %created.id, "device created");
        Ok(created)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, HomeschedError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all devices in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_devices(&self) -> Result<Vec<Device>, HomeschedError> {
        self.repo.get_all().await
    }

    /// Persist the current state of a device.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::NotFound`] if the device was never created,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id))]
    pub async fn save_device(&self, device: Device) -> Result<Device, HomeschedError> {
        self.repo.update(device).await
    }

    /// Apply a command to a device right away and persist the result.
    ///
    /// A command the device's variant does not support changes nothing and
    /// is not saved.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::NotFound`] when the device does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self, command), fields(command = %command))]
    pub async fn execute_command(
        &self,
        id: DeviceId,
        command: Command,
    ) -> Result<Device, HomeschedError> {
        let mut device = self.get_device(id).await?;
        if !device.apply(command) {
            tracing::debug!(device_type = %device.device_type(), "command not supported by device");
            return Ok(device);
        }
        self.save_device(device).await
    }

    /// Sum of the instantaneous energy usage of every device.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn total_energy_usage(&self) -> Result<f64, HomeschedError> {
        let devices = self.repo.get_all().await?;
        Ok(devices.iter().map(Device::energy_usage).sum())
    }
}
