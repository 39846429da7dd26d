//! Schema version 1 data-transfer shapes.
//!
//! Self-contained: this module keeps its own enumerations and struct shapes,
//! never the model's, so the in-memory model can gain cases and fields across
//! releases while bytes written under sentinel 1 stay readable. All enum
//! mappings are explicit and by name, never ordinal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use wearsync_domain::device::{DeviceMetadata, DeviceModel};
use wearsync_domain::group::Group;
use wearsync_domain::id::{GroupId, SessionId};
use wearsync_domain::loadable::KnownDevices;
use wearsync_domain::module::{
    self, AccelerometerModel, BarometerModel, GyroscopeModel, Module, ThermometerSource,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct KnownDevicesDto {
    devices: Vec<MetadataDto>,
    groups: Vec<GroupDto>,
    groups_recovery: Vec<GroupDto>,
}

impl KnownDevicesDto {
    pub(super) fn from_model(model: &KnownDevices) -> Self {
        Self {
            devices: model.devices.iter().map(MetadataDto::from_model).collect(),
            groups: model.groups.iter().map(GroupDto::from_model).collect(),
            groups_recovery: model
                .groups_recovery
                .iter()
                .map(GroupDto::from_model)
                .collect(),
        }
    }

    pub(super) fn into_model(self) -> KnownDevices {
        KnownDevices {
            devices: self
                .devices
                .into_iter()
                .map(MetadataDto::into_model)
                .collect(),
            groups: self.groups.into_iter().map(GroupDto::into_model).collect(),
            groups_recovery: self
                .groups_recovery
                .into_iter()
                .map(GroupDto::into_model)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupDto {
    id: uuid::Uuid,
    device_macs: BTreeSet<String>,
    name: String,
}

impl GroupDto {
    fn from_model(model: &Group) -> Self {
        Self {
            id: model.id.as_uuid(),
            device_macs: model.members.iter().cloned().collect(),
            name: model.name.clone(),
        }
    }

    fn into_model(self) -> Group {
        Group {
            id: GroupId::from_uuid(self.id),
            members: self.device_macs,
            name: self.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDto {
    mac: String,
    serial: String,
    model: DeviceModelDto,
    modules: Vec<ModuleDto>,
    session_ids: BTreeSet<uuid::Uuid>,
    name: String,
}

impl MetadataDto {
    fn from_model(model: &DeviceMetadata) -> Self {
        Self {
            mac: model.mac.clone(),
            serial: model.serial.clone(),
            model: DeviceModelDto::from_model(model.model),
            modules: model.modules.values().map(ModuleDto::from_model).collect(),
            session_ids: model.session_ids.iter().map(|id| id.as_uuid()).collect(),
            name: model.name.clone(),
        }
    }

    fn into_model(self) -> DeviceMetadata {
        DeviceMetadata {
            mac: self.mac,
            serial: self.serial,
            model: self.model.into_model(),
            modules: module::table_from(self.modules.into_iter().map(ModuleDto::into_model)),
            session_ids: self
                .session_ids
                .into_iter()
                .map(SessionId::from_uuid)
                .collect(),
            name: self.name,
        }
    }
}

/// Hardware variants as of schema version 1.
///
/// Deserialization is hand-written so that case names written by releases
/// newer than this build land on `Unknown`; those records stay loadable
/// instead of failing the aggregate.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
enum DeviceModelDto {
    WearR,
    WearRg,
    WearRpro,
    WearC,
    WearCpro,
    Environment,
    Detector,
    Health,
    Tracker,
    MotionR,
    MotionRl,
    MotionC,
    MotionS,
    Unknown,
}

impl<'de> Deserialize<'de> for DeviceModelDto {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "wearR" => Self::WearR,
            "wearRg" => Self::WearRg,
            "wearRpro" => Self::WearRpro,
            "wearC" => Self::WearC,
            "wearCpro" => Self::WearCpro,
            "environment" => Self::Environment,
            "detector" => Self::Detector,
            "health" => Self::Health,
            "tracker" => Self::Tracker,
            "motionR" => Self::MotionR,
            "motionRl" => Self::MotionRl,
            "motionC" => Self::MotionC,
            "motionS" => Self::MotionS,
            _ => Self::Unknown,
        })
    }
}

impl DeviceModelDto {
    fn from_model(model: DeviceModel) -> Self {
        match model {
            DeviceModel::WearR => Self::WearR,
            DeviceModel::WearRg => Self::WearRg,
            DeviceModel::WearRpro => Self::WearRpro,
            DeviceModel::WearC => Self::WearC,
            DeviceModel::WearCpro => Self::WearCpro,
            DeviceModel::Environment => Self::Environment,
            DeviceModel::Detector => Self::Detector,
            DeviceModel::Health => Self::Health,
            DeviceModel::Tracker => Self::Tracker,
            DeviceModel::MotionR => Self::MotionR,
            DeviceModel::MotionRl => Self::MotionRl,
            DeviceModel::MotionC => Self::MotionC,
            DeviceModel::MotionS => Self::MotionS,
            DeviceModel::Unknown => Self::Unknown,
        }
    }

    fn into_model(self) -> DeviceModel {
        match self {
            Self::WearR => DeviceModel::WearR,
            Self::WearRg => DeviceModel::WearRg,
            Self::WearRpro => DeviceModel::WearRpro,
            Self::WearC => DeviceModel::WearC,
            Self::WearCpro => DeviceModel::WearCpro,
            Self::Environment => DeviceModel::Environment,
            Self::Detector => DeviceModel::Detector,
            Self::Health => DeviceModel::Health,
            Self::Tracker => DeviceModel::Tracker,
            Self::MotionR => DeviceModel::MotionR,
            Self::MotionRl => DeviceModel::MotionRl,
            Self::MotionC => DeviceModel::MotionC,
            Self::MotionS => DeviceModel::MotionS,
            Self::Unknown => DeviceModel::Unknown,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ModuleDto {
    Accelerometer(AccelerometerDto),
    Barometer(BarometerDto),
    Gyroscope(GyroscopeDto),
    Humidity,
    Illuminance,
    Magnetometer,
    SensorFusion,
    Thermometer(Vec<ThermometerDto>),
    MechanicalSwitch,
    Led,
    Gpio,
    IBeacon,
    Haptic,
    I2c,
}

impl ModuleDto {
    fn from_model(model: &Module) -> Self {
        match model {
            Module::Accelerometer(m) => Self::Accelerometer(AccelerometerDto::from_model(*m)),
            Module::Barometer(m) => Self::Barometer(BarometerDto::from_model(*m)),
            Module::Gyroscope(m) => Self::Gyroscope(GyroscopeDto::from_model(*m)),
            Module::Humidity => Self::Humidity,
            Module::Illuminance => Self::Illuminance,
            Module::Magnetometer => Self::Magnetometer,
            Module::SensorFusion => Self::SensorFusion,
            Module::Thermometer(sources) => Self::Thermometer(
                sources.iter().map(|s| ThermometerDto::from_model(*s)).collect(),
            ),
            Module::MechanicalSwitch => Self::MechanicalSwitch,
            Module::Led => Self::Led,
            Module::Gpio => Self::Gpio,
            Module::IBeacon => Self::IBeacon,
            Module::Haptic => Self::Haptic,
            Module::I2c => Self::I2c,
        }
    }

    fn into_model(self) -> Module {
        match self {
            Self::Accelerometer(m) => Module::Accelerometer(m.into_model()),
            Self::Barometer(m) => Module::Barometer(m.into_model()),
            Self::Gyroscope(m) => Module::Gyroscope(m.into_model()),
            Self::Humidity => Module::Humidity,
            Self::Illuminance => Module::Illuminance,
            Self::Magnetometer => Module::Magnetometer,
            Self::SensorFusion => Module::SensorFusion,
            Self::Thermometer(sources) => Module::Thermometer(
                sources.into_iter().map(ThermometerDto::into_model).collect(),
            ),
            Self::MechanicalSwitch => Module::MechanicalSwitch,
            Self::Led => Module::Led,
            Self::Gpio => Module::Gpio,
            Self::IBeacon => Module::IBeacon,
            Self::Haptic => Module::Haptic,
            Self::I2c => Module::I2c,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum AccelerometerDto {
    Bmi160,
    Bmi270,
    Bma255,
}

impl AccelerometerDto {
    fn from_model(model: AccelerometerModel) -> Self {
        match model {
            AccelerometerModel::Bmi160 => Self::Bmi160,
            AccelerometerModel::Bmi270 => Self::Bmi270,
            AccelerometerModel::Bma255 => Self::Bma255,
        }
    }

    fn into_model(self) -> AccelerometerModel {
        match self {
            Self::Bmi160 => AccelerometerModel::Bmi160,
            Self::Bmi270 => AccelerometerModel::Bmi270,
            Self::Bma255 => AccelerometerModel::Bma255,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum BarometerDto {
    Bmp280,
    Bme280,
}

impl BarometerDto {
    fn from_model(model: BarometerModel) -> Self {
        match model {
            BarometerModel::Bmp280 => Self::Bmp280,
            BarometerModel::Bme280 => Self::Bme280,
        }
    }

    fn into_model(self) -> BarometerModel {
        match self {
            Self::Bmp280 => BarometerModel::Bmp280,
            Self::Bme280 => BarometerModel::Bme280,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum GyroscopeDto {
    Bmi160,
    Bmi270,
}

impl GyroscopeDto {
    fn from_model(model: GyroscopeModel) -> Self {
        match model {
            GyroscopeModel::Bmi160 => Self::Bmi160,
            GyroscopeModel::Bmi270 => Self::Bmi270,
        }
    }

    fn into_model(self) -> GyroscopeModel {
        match self {
            Self::Bmi160 => GyroscopeModel::Bmi160,
            Self::Bmi270 => GyroscopeModel::Bmi270,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ThermometerDto {
    OnDie,
    External,
    Bmp280,
    Onboard,
    Custom,
}

impl ThermometerDto {
    fn from_model(model: ThermometerSource) -> Self {
        match model {
            ThermometerSource::OnDie => Self::OnDie,
            ThermometerSource::External => Self::External,
            ThermometerSource::Bmp280 => Self::Bmp280,
            ThermometerSource::Onboard => Self::Onboard,
            ThermometerSource::Custom => Self::Custom,
        }
    }

    fn into_model(self) -> ThermometerSource {
        match self {
            Self::OnDie => ThermometerSource::OnDie,
            Self::External => ThermometerSource::External,
            Self::Bmp280 => ThermometerSource::Bmp280,
            Self::Onboard => ThermometerSource::Onboard,
            Self::Custom => ThermometerSource::Custom,
        }
    }
}
