//! Modules — sensing capabilities detected on a device, with hardware variants.
//!
//! A device has at most one module per [`ModuleKind`], except thermometers:
//! boards often carry several physical temperature sources, so that variant
//! holds an ordered list.
//!
//! Serde derives here are for in-process transfer only. Persistence goes
//! through the versioned codec in the `app` crate, which maps these types to
//! schema-pinned DTOs.

use serde::{Deserialize, Serialize};

/// Capability key, ignoring hardware variants.
///
/// Use as the map key for a device's module table so each capability appears
/// at most once.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    Accelerometer,
    Barometer,
    Gyroscope,
    Humidity,
    Illuminance,
    Magnetometer,
    SensorFusion,
    Thermometer,
    MechanicalSwitch,
    Led,
    Gpio,
    IBeacon,
    Haptic,
    I2c,
}

/// Accelerometer chip revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccelerometerModel {
    Bmi160,
    Bmi270,
    Bma255,
}

/// Barometer chip revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarometerModel {
    Bmp280,
    Bme280,
}

/// Gyroscope chip revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GyroscopeModel {
    Bmi160,
    Bmi270,
}

/// Physical temperature sources a board may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThermometerSource {
    OnDie,
    External,
    Bmp280,
    Onboard,
    Custom,
}

/// One sensing capability and its hardware variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Accelerometer(AccelerometerModel),
    Barometer(BarometerModel),
    Gyroscope(GyroscopeModel),
    Humidity,
    Illuminance,
    Magnetometer,
    SensorFusion,
    /// Ordered list of physical temperature sources on the board.
    Thermometer(Vec<ThermometerSource>),
    MechanicalSwitch,
    Led,
    Gpio,
    IBeacon,
    Haptic,
    I2c,
}

impl Module {
    /// The capability key for this module, ignoring hardware variants.
    #[must_use]
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::Accelerometer(_) => ModuleKind::Accelerometer,
            Self::Barometer(_) => ModuleKind::Barometer,
            Self::Gyroscope(_) => ModuleKind::Gyroscope,
            Self::Humidity => ModuleKind::Humidity,
            Self::Illuminance => ModuleKind::Illuminance,
            Self::Magnetometer => ModuleKind::Magnetometer,
            Self::SensorFusion => ModuleKind::SensorFusion,
            Self::Thermometer(_) => ModuleKind::Thermometer,
            Self::MechanicalSwitch => ModuleKind::MechanicalSwitch,
            Self::Led => ModuleKind::Led,
            Self::Gpio => ModuleKind::Gpio,
            Self::IBeacon => ModuleKind::IBeacon,
            Self::Haptic => ModuleKind::Haptic,
            Self::I2c => ModuleKind::I2c,
        }
    }
}

/// Build a module table keyed by capability from an enumeration result.
///
/// Later entries win when a kind repeats, matching re-enumeration semantics.
#[must_use]
pub fn table_from(modules: impl IntoIterator<Item = Module>) -> std::collections::BTreeMap<ModuleKind, Module> {
    modules
        .into_iter()
        .map(|module| (module.kind(), module))
        .collect()
}
