//! `SQLite` implementation of [`DeviceRepository`].
//!
//! The `type` column is the discriminant: the row decoder reads it first and
//! then only the payload column that belongs to that variant.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use homesched_app::ports::DeviceRepository;
use homesched_domain::device::{Device, DeviceKind, DeviceType, NewDevice};
use homesched_domain::error::{HomeschedError, NotFoundError};
use homesched_domain::id::DeviceId;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

fn missing_payload(column: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: "payload column is NULL for this device type".into(),
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let location: String = row.try_get("location")?;
        let device_type: String = row.try_get("type")?;
        let status: bool = row.try_get("status")?;

        let device_type =
            DeviceType::from_str(&device_type).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let kind = match device_type {
            DeviceType::Light => {
                let brightness: Option<i64> = row.try_get("brightness")?;
                DeviceKind::light(brightness.ok_or_else(|| missing_payload("brightness"))?)
            }
            DeviceType::Thermostat => {
                let temperature: Option<f64> = row.try_get("temperature")?;
                DeviceKind::thermostat(temperature.ok_or_else(|| missing_payload("temperature"))?)
            }
            DeviceType::Alarm => {
                let armed: Option<bool> = row.try_get("armed")?;
                DeviceKind::alarm(armed.ok_or_else(|| missing_payload("armed"))?)
            }
        };

        Ok(Self(Device::restore(
            DeviceId::from_raw(id),
            name,
            location,
            status,
            kind,
        )))
    }
}

/// Payload columns for a variant; the two that do not apply are `NULL`.
fn payload_columns(kind: DeviceKind) -> (Option<i64>, Option<f64>, Option<bool>) {
    match kind {
        DeviceKind::Light { brightness } => (Some(i64::from(brightness)), None, None),
        DeviceKind::Thermostat { temperature } => (None, Some(temperature), None),
        DeviceKind::Alarm { armed } => (None, None, Some(armed)),
    }
}

const INSERT: &str = "INSERT INTO devices (name, location, type, status, voltage, brightness, temperature, armed) VALUES (?, ?, ?, 0, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY id";
const UPDATE: &str = "UPDATE devices SET name = ?, location = ?, status = ?, voltage = ?, brightness = ?, temperature = ?, armed = ? WHERE id = ? AND type = ?";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (brightness, temperature, armed) = payload_columns(device.kind);
            // a new device is powered off
            let voltage = Device::from_new(DeviceId::from_raw(0), device.clone()).voltage();

            let result = sqlx::query(INSERT)
                .bind(&device.name)
                .bind(&device.location)
                .bind(device.kind.device_type().as_str())
                .bind(voltage)
                .bind(brightness)
                .bind(temperature)
                .bind(armed)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Device::from_new(
                DeviceId::from_raw(result.last_insert_rowid()),
                device,
            ))
        }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_raw())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, HomeschedError>> + Send {
        let pool = self.pool.clone();
        async move {
            let (brightness, temperature, armed) = payload_columns(device.kind());

            let result = sqlx::query(UPDATE)
                .bind(&device.name)
                .bind(&device.location)
                .bind(device.status)
                .bind(device.voltage())
                .bind(brightness)
                .bind(temperature)
                .bind(armed)
                .bind(device.id.as_raw())
                .bind(device.device_type().as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            // also covers a row whose stored type differs: the variant never changes
            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into());
            }

            Ok(device)
        }
    }
}
