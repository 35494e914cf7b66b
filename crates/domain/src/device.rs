//! Device: a controllable unit with on/off state and one variant-specific payload.
//!
//! The variant ([`DeviceKind`]) is fixed when the device is created. Voltage is
//! never stored on the model; it is derived from the payload and the power
//! status every time it is read, so it cannot drift out of sync with them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{HomeschedError, ValidationError};
use crate::id::DeviceId;

pub const MIN_BRIGHTNESS: u8 = 0;
pub const MAX_BRIGHTNESS: u8 = 100;
pub const MIN_TEMPERATURE: f64 = 10.0;
pub const MAX_TEMPERATURE: f64 = 30.0;

pub const DEFAULT_BRIGHTNESS: u8 = 50;
pub const DEFAULT_TEMPERATURE: f64 = 22.0;

const LIGHT_BASE_VOLTAGE: f64 = 5.0;
const LIGHT_VOLTAGE_PER_STEP: f64 = 0.1;
const THERMOSTAT_BASE_VOLTAGE: f64 = 15.0;
const THERMOSTAT_SETPOINT: f64 = 22.0;
const ARMED_ALARM_VOLTAGE: f64 = 2.0;
const ENERGY_FACTOR: f64 = 0.1;

/// Discriminant identifying which variant a device is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Thermostat,
    Alarm,
}

impl DeviceType {
    /// Stable lowercase name, used as the persisted discriminant.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Alarm => "alarm",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "thermostat" => Ok(Self::Thermostat),
            "alarm" => Ok(Self::Alarm),
            _ => Err(ValidationError::UnknownDeviceType {
                value: s.to_string(),
            }),
        }
    }
}

/// Variant payload of a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceKind {
    Light { brightness: u8 },
    Thermostat { temperature: f64 },
    Alarm { armed: bool },
}

impl DeviceKind {
    /// A light, brightness clamped to `0..=100`.
    #[must_use]
    pub fn light(brightness: i64) -> Self {
        Self::Light {
            brightness: clamp_brightness(brightness),
        }
    }

    /// A thermostat, temperature clamped to `10.0..=30.0`.
    /// NaN falls back to [`DEFAULT_TEMPERATURE`].
    #[must_use]
    pub fn thermostat(temperature: f64) -> Self {
        Self::Thermostat {
            temperature: clamp_temperature(temperature).unwrap_or(DEFAULT_TEMPERATURE),
        }
    }

    #[must_use]
    pub fn alarm(armed: bool) -> Self {
        Self::Alarm { armed }
    }

    /// The payload a freshly added device of `device_type` starts with.
    #[must_use]
    pub fn default_for(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Light => Self::Light {
                brightness: DEFAULT_BRIGHTNESS,
            },
            DeviceType::Thermostat => Self::Thermostat {
                temperature: DEFAULT_TEMPERATURE,
            },
            DeviceType::Alarm => Self::Alarm { armed: false },
        }
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Light { .. } => DeviceType::Light,
            Self::Thermostat { .. } => DeviceType::Thermostat,
            Self::Alarm { .. } => DeviceType::Alarm,
        }
    }
}

fn clamp_brightness(value: i64) -> u8 {
    let clamped = value.clamp(i64::from(MIN_BRIGHTNESS), i64::from(MAX_BRIGHTNESS));
    u8::try_from(clamped).unwrap_or(MAX_BRIGHTNESS)
}

fn clamp_temperature(value: f64) -> Option<f64> {
    (!value.is_nan()).then(|| value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE))
}

/// A persisted device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub location: String,
    /// Powered on (`true`) or off.
    pub status: bool,
    kind: DeviceKind,
}

impl Device {
    /// Rebuild a device from stored fields.
    #[must_use]
    pub fn restore(
        id: DeviceId,
        name: impl Into<String>,
        location: impl Into<String>,
        status: bool,
        kind: DeviceKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            status,
            kind,
        }
    }

    /// Attach storage-assigned identity to a draft. The device starts powered off.
    #[must_use]
    pub fn from_new(id: DeviceId, new: NewDevice) -> Self {
        Self::restore(id, new.name, new.location, false, new.kind)
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.kind.device_type()
    }

    pub fn turn_on(&mut self) {
        self.status = true;
    }

    pub fn turn_off(&mut self) {
        self.status = false;
    }

    /// Set a light's brightness, clamped to `0..=100`.
    ///
    /// Returns `false` (and changes nothing) when the device is not a light.
    pub fn set_brightness(&mut self, value: i64) -> bool {
        match &mut self.kind {
            DeviceKind::Light { brightness } => {
                *brightness = clamp_brightness(value);
                true
            }
            _ => false,
        }
    }

    /// Set a thermostat's temperature, clamped to `10.0..=30.0`.
    ///
    /// Returns `false` (and changes nothing) when the device is not a
    /// thermostat or `value` is NaN. Infinities clamp like any other value.
    pub fn set_temperature(&mut self, value: f64) -> bool {
        match (&mut self.kind, clamp_temperature(value)) {
            (DeviceKind::Thermostat { temperature }, Some(clamped)) => {
                *temperature = clamped;
                true
            }
            _ => false,
        }
    }

    /// Arm an alarm. Returns `false` when the device is not an alarm.
    pub fn arm(&mut self) -> bool {
        self.set_armed(true)
    }

    /// Disarm an alarm. Returns `false` when the device is not an alarm.
    pub fn disarm(&mut self) -> bool {
        self.set_armed(false)
    }

    fn set_armed(&mut self, value: bool) -> bool {
        match &mut self.kind {
            DeviceKind::Alarm { armed } => {
                *armed = value;
                true
            }
            _ => false,
        }
    }

    /// Apply a command.
    ///
    /// Returns `false` when the command does not apply to this variant, in
    /// which case the device is left untouched.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::TurnOn => {
                self.turn_on();
                true
            }
            Command::TurnOff => {
                self.turn_off();
                true
            }
            Command::SetBrightness(value) => self.set_brightness(value),
            Command::SetTemperature(value) => self.set_temperature(value),
            Command::Arm => self.arm(),
            Command::Disarm => self.disarm(),
        }
    }

    /// Derived voltage.
    ///
    /// An alarm draws power while armed regardless of `status`; every other
    /// variant draws nothing while off.
    #[must_use]
    pub fn voltage(&self) -> f64 {
        match self.kind {
            DeviceKind::Alarm { armed } => {
                if armed {
                    ARMED_ALARM_VOLTAGE
                } else {
                    0.0
                }
            }
            _ if !self.status => 0.0,
            DeviceKind::Light { brightness } => {
                LIGHT_BASE_VOLTAGE + LIGHT_VOLTAGE_PER_STEP * f64::from(brightness)
            }
            DeviceKind::Thermostat { temperature } => {
                THERMOSTAT_BASE_VOLTAGE + (THERMOSTAT_SETPOINT - temperature).abs()
            }
        }
    }

    /// Instantaneous energy usage rate (`voltage × 0.1`).
    #[must_use]
    pub fn energy_usage(&self) -> f64 {
        self.voltage() * ENERGY_FACTOR
    }
}

/// A device that has not been stored yet and therefore has no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub location: String,
    pub kind: DeviceKind,
}

impl NewDevice {
    /// Create a builder for constructing a [`NewDevice`].
    #[must_use]
    pub fn builder() -> NewDeviceBuilder {
        NewDeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HomeschedError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`NewDevice`].
#[derive(Debug, Default)]
pub struct NewDeviceBuilder {
    name: Option<String>,
    location: Option<String>,
    kind: Option<DeviceKind>,
}

impl NewDeviceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Use the default payload for `device_type`.
    #[must_use]
    pub fn device_type(self, device_type: DeviceType) -> Self {
        self.kind(DeviceKind::default_for(device_type))
    }

    /// Consume the builder, validate, and return a [`NewDevice`].
    ///
    /// # Errors
    ///
    /// Returns [`HomeschedError::Validation`] if `name` is missing or empty,
    /// or no kind was given.
    pub fn build(self) -> Result<NewDevice, HomeschedError> {
        let device = NewDevice {
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            kind: self.kind.ok_or(ValidationError::MissingDeviceKind)?,
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn device(kind: DeviceKind) -> Device {
        Device::restore(DeviceId::from_raw(1), "Test", "Lab", false, kind)
    }

    #[test]
    fn should_start_with_zero_voltage_when_off() {
        for kind in [
            DeviceKind::light(80),
            DeviceKind::thermostat(12.0),
            DeviceKind::alarm(false),
        ] {
            assert_close(device(kind).voltage(), 0.0);
        }
    }

    #[test]
    fn should_compute_energy_for_lamp_example() {
        let mut lamp = device(DeviceKind::default_for(DeviceType::Light));
        assert!(lamp.set_brightness(75));
        lamp.turn_on();
        assert_close(lamp.voltage(), 12.5);
        assert_close(lamp.energy_usage(), 1.25);
    }

    #[test]
    fn should_clamp_brightness_and_derive_voltage_for_any_input() {
        for input in [-1000, -1, 0, 1, 42, 99, 100, 101, 255, i64::MAX, i64::MIN] {
            let mut light = device(DeviceKind::light(50));
            light.turn_on();
            assert!(light.set_brightness(input));

            let expected = input.clamp(0, 100);
            let DeviceKind::Light { brightness } = light.kind() else {
                panic!("variant changed");
            };
            assert_eq!(i64::from(brightness), expected);
            assert_close(light.voltage(), 5.0 + 0.1 * f64::from(brightness));
        }
    }

    #[test]
    fn should_keep_voltage_zero_when_light_adjusted_while_off() {
        let mut light = device(DeviceKind::light(10));
        assert!(light.set_brightness(90));
        assert_close(light.voltage(), 0.0);
        light.turn_on();
        assert_close(light.voltage(), 14.0);
    }

    #[test]
    fn should_clamp_temperature_and_derive_voltage_for_any_input() {
        for input in [-40.0, 0.0, 10.0, 15.5, 22.0, 29.9, 30.0, 31.0, 1e9] {
            let mut thermostat = device(DeviceKind::thermostat(22.0));
            thermostat.turn_on();
            assert!(thermostat.set_temperature(input));

            let expected: f64 = f64::clamp(input, 10.0, 30.0);
            let DeviceKind::Thermostat { temperature } = thermostat.kind() else {
                panic!("variant changed");
            };
            assert_close(temperature, expected);
            assert_close(thermostat.voltage(), 15.0 + (22.0 - expected).abs());
        }
    }

    #[test]
    fn should_ignore_nan_temperature() {
        let mut thermostat = device(DeviceKind::thermostat(18.0));
        assert!(!thermostat.set_temperature(f64::NAN));
        assert_eq!(thermostat.kind(), DeviceKind::Thermostat { temperature: 18.0 });
    }

    #[test]
    fn should_clamp_infinite_temperature() {
        let mut thermostat = device(DeviceKind::thermostat(18.0));
        assert!(thermostat.set_temperature(f64::INFINITY));
        assert_eq!(thermostat.kind(), DeviceKind::Thermostat { temperature: 30.0 });
        assert!(thermostat.set_temperature(f64::NEG_INFINITY));
        assert_eq!(thermostat.kind(), DeviceKind::Thermostat { temperature: 10.0 });
    }

    #[test]
    fn should_fall_back_to_default_temperature_when_constructed_with_nan() {
        assert_eq!(
            DeviceKind::thermostat(f64::NAN),
            DeviceKind::Thermostat {
                temperature: DEFAULT_TEMPERATURE
            }
        );
    }

    #[test]
    fn should_draw_base_voltage_at_setpoint() {
        let mut thermostat = device(DeviceKind::thermostat(22.0));
        thermostat.turn_on();
        assert_close(thermostat.voltage(), 15.0);
    }

    #[test]
    fn should_drive_voltage_to_zero_on_turn_off() {
        let mut light = device(DeviceKind::light(100));
        light.turn_on();
        light.turn_off();
        assert_close(light.voltage(), 0.0);

        let mut thermostat = device(DeviceKind::thermostat(30.0));
        thermostat.turn_on();
        thermostat.turn_off();
        assert_close(thermostat.voltage(), 0.0);
    }

    #[test]
    fn should_be_idempotent_when_already_in_target_state() {
        let mut light = device(DeviceKind::light(20));
        light.turn_on();
        light.turn_on();
        assert!(light.status);
        assert_close(light.voltage(), 7.0);
        light.turn_off();
        light.turn_off();
        assert!(!light.status);
    }

    #[test]
    fn should_toggle_alarm_voltage_independently_of_status() {
        let mut alarm = device(DeviceKind::alarm(false));
        assert!(alarm.arm());
        assert_close(alarm.voltage(), 2.0);
        assert!(alarm.arm());
        assert_close(alarm.voltage(), 2.0);

        alarm.turn_on();
        assert_close(alarm.voltage(), 2.0);
        alarm.turn_off();
        assert_close(alarm.voltage(), 2.0);

        assert!(alarm.disarm());
        assert!(alarm.disarm());
        assert_close(alarm.voltage(), 0.0);

        alarm.turn_on();
        assert_close(alarm.voltage(), 0.0);
        assert_close(alarm.energy_usage(), 0.0);
    }

    #[test]
    fn should_ignore_commands_unsupported_by_variant() {
        let mut thermostat = device(DeviceKind::thermostat(20.0));
        let before = thermostat.clone();
        assert!(!thermostat.apply(Command::SetBrightness(40)));
        assert!(!thermostat.apply(Command::Arm));
        assert_eq!(thermostat, before);

        let mut light = device(DeviceKind::light(30));
        assert!(!light.apply(Command::SetTemperature(25.0)));
        assert!(!light.apply(Command::Disarm));

        let mut alarm = device(DeviceKind::alarm(true));
        assert!(!alarm.apply(Command::SetBrightness(1)));
        assert_eq!(alarm.kind(), DeviceKind::Alarm { armed: true });
    }

    #[test]
    fn should_apply_power_commands_to_every_variant() {
        for kind in [
            DeviceKind::light(1),
            DeviceKind::thermostat(20.0),
            DeviceKind::alarm(false),
        ] {
            let mut dev = device(kind);
            assert!(dev.apply(Command::TurnOn));
            assert!(dev.status);
            assert!(dev.apply(Command::TurnOff));
            assert!(!dev.status);
            assert_eq!(dev.device_type(), kind.device_type());
        }
    }

    #[test]
    fn should_use_source_defaults_for_new_devices() {
        assert_eq!(
            DeviceKind::default_for(DeviceType::Light),
            DeviceKind::Light { brightness: 50 }
        );
        assert_eq!(
            DeviceKind::default_for(DeviceType::Thermostat),
            DeviceKind::Thermostat { temperature: 22.0 }
        );
        assert_eq!(
            DeviceKind::default_for(DeviceType::Alarm),
            DeviceKind::Alarm { armed: false }
        );
    }

    #[test]
    fn should_start_powered_off_when_created_from_draft() {
        let new = NewDevice::builder()
            .name("Lamp")
            .location("Hall")
            .device_type(DeviceType::Light)
            .build()
            .unwrap();
        let dev = Device::from_new(DeviceId::from_raw(9), new);
        assert_eq!(dev.id, DeviceId::from_raw(9));
        assert!(!dev.status);
        assert_close(dev.voltage(), 0.0);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = NewDevice::builder()
            .name("  ")
            .kind(DeviceKind::alarm(false))
            .build();
        assert!(matches!(
            result,
            Err(HomeschedError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_kind_is_missing() {
        let result = NewDevice::builder().name("Lamp").build();
        assert!(matches!(
            result,
            Err(HomeschedError::Validation(ValidationError::MissingDeviceKind))
        ));
    }

    #[test]
    fn should_parse_device_type_case_insensitively() {
        assert_eq!("Light".parse::<DeviceType>().unwrap(), DeviceType::Light);
        assert_eq!("ALARM".parse::<DeviceType>().unwrap(), DeviceType::Alarm);
        assert!(matches!(
            "toaster".parse::<DeviceType>(),
            Err(ValidationError::UnknownDeviceType { .. })
        ));
    }

    #[test]
    fn should_serialize_kind_with_explicit_discriminant() {
        let json = serde_json::to_value(DeviceKind::light(75)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "light", "brightness": 75}));
        let parsed: DeviceKind = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, DeviceKind::Light { brightness: 75 });
    }
}
