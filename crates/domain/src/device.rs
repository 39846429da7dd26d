//! Device metadata — identifying information for a previously-seen sensor.
//!
//! Serde derives here are for in-process transfer only. Persistence goes
//! through the versioned codec in the `app` crate, which maps these types to
//! schema-pinned DTOs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WearSyncError};
use crate::id::SessionId;
use crate::module::{Module, ModuleKind};

/// Stable hardware identifier a device is keyed by.
pub type MacAddress = String;

/// Closed enumeration of hardware variants this build knows about.
///
/// Data written by a newer release may reference hardware this build has
/// never heard of; such records decode to [`DeviceModel::Unknown`] rather
/// than failing the whole aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceModel {
    Unknown,
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
}

/// Semi-permanent identifying information for a device across host machines.
///
/// Keyed by MAC address; the MAC is immutable once the record is created.
/// Session identifiers are transient platform handles and may grow as the
/// device is paired on more hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub mac: MacAddress,
    pub serial: String,
    pub model: DeviceModel,
    /// Detected capabilities, at most one entry per kind.
    pub modules: BTreeMap<ModuleKind, Module>,
    /// Bluetooth session identifiers this device has presented locally.
    pub session_ids: BTreeSet<SessionId>,
    /// User-assigned display name.
    pub name: String,
}

impl DeviceMetadata {
    /// Create a builder for constructing a [`DeviceMetadata`].
    #[must_use]
    pub fn builder() -> DeviceMetadataBuilder {
        DeviceMetadataBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WearSyncError::Validation`] when `mac` or `name` is empty.
    pub fn validate(&self) -> Result<(), WearSyncError> {
        if self.mac.is_empty() {
            return Err(ValidationError::EmptyMac.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Ordering for display lists: case-insensitive name, then MAC.
impl Ord for DeviceMetadata {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_name = self
            .name
            .to_lowercase()
            .cmp(&other.name.to_lowercase());
        if by_name != Ordering::Equal {
            return by_name;
        }
        self.mac.to_lowercase().cmp(&other.mac.to_lowercase())
    }
}

impl PartialOrd for DeviceMetadata {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Step-by-step builder for [`DeviceMetadata`].
#[derive(Debug, Default)]
pub struct DeviceMetadataBuilder {
    mac: Option<MacAddress>,
    serial: Option<String>,
    model: Option<DeviceModel>,
    modules: BTreeMap<ModuleKind, Module>,
    session_ids: BTreeSet<SessionId>,
    name: Option<String>,
}

impl DeviceMetadataBuilder {
    #[must_use]
    pub fn mac(mut self, mac: impl Into<MacAddress>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    #[must_use]
    pub fn serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: DeviceModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Add one detected module, replacing any prior entry of the same kind.
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.modules.insert(module.kind(), module);
        self
    }

    #[must_use]
    pub fn session_id(mut self, id: SessionId) -> Self {
        self.session_ids.insert(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Consume the builder, validate, and return a [`DeviceMetadata`].
    ///
    /// # Errors
    ///
    /// Returns [`WearSyncError::Validation`] if `mac` or `name` is missing
    /// or empty.
    pub fn build(self) -> Result<DeviceMetadata, WearSyncError> {
        let metadata = DeviceMetadata {
            mac: self.mac.unwrap_or_default(),
            serial: self.serial.unwrap_or_default(),
            model: self.model.unwrap_or(DeviceModel::Unknown),
            modules: self.modules,
            session_ids: self.session_ids,
            name: self.name.unwrap_or_default(),
        };
        metadata.validate()?;
        Ok(metadata)
    }
}

/// A known device, with a live connection handle when one exists.
///
/// The connection layer resolves reachability; this model only records it.
/// The handle type is generic because hardware IO lives outside this core.
#[derive(Debug, Clone)]
pub enum KnownDevice<H> {
    /// Metadata only; the device is not currently reachable.
    Known { metadata: DeviceMetadata },
    /// Metadata plus a live handle supplied by the connection layer.
    KnownAndReachable { metadata: DeviceMetadata, handle: H },
}

impl<H> KnownDevice<H> {
    /// The metadata record, regardless of reachability.
    #[must_use]
    pub fn metadata(&self) -> &DeviceMetadata {
        match self {
            Self::Known { metadata } | Self::KnownAndReachable { metadata, .. } => metadata,
        }
    }

    /// Mutable access to the metadata record.
    pub fn metadata_mut(&mut self) -> &mut DeviceMetadata {
        match self {
            Self::Known { metadata } | Self::KnownAndReachable { metadata, .. } => metadata,
        }
    }

    /// The live handle, when the device is reachable.
    pub fn handle(&self) -> Option<&H> {
        match self {
            Self::Known { .. } => None,
            Self::KnownAndReachable { handle, .. } => Some(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::AccelerometerModel;

    fn valid_device() -> DeviceMetadata {
        DeviceMetadata::builder()
            .mac("AA:BB:CC:DD:EE:FF")
            .serial("0123AB")
            .model(DeviceModel::MotionS)
            .name("Left Wrist")
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_device_when_mac_and_name_provided() {
        let device = valid_device();
        assert_eq!(device.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(device.model, DeviceModel::MotionS);
        assert!(device.modules.is_empty());
    }

    #[test]
    fn should_reject_build_when_mac_is_missing() {
        let result = DeviceMetadata::builder().name("Sensor").build();
        assert!(matches!(
            result,
            Err(WearSyncError::Validation(ValidationError::EmptyMac))
        ));
    }

    #[test]
    fn should_reject_build_when_name_is_empty() {
        let result = DeviceMetadata::builder().mac("AA:BB").build();
        assert!(matches!(
            result,
            Err(WearSyncError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_default_model_to_unknown() {
        let device = DeviceMetadata::builder()
            .mac("AA:BB")
            .name("Sensor")
            .build()
            .unwrap();
        assert_eq!(device.model, DeviceModel::Unknown);
    }

    #[test]
    fn should_replace_module_of_same_kind_when_reenumerated() {
        let device = DeviceMetadata::builder()
            .mac("AA:BB")
            .name("Sensor")
            .module(Module::Accelerometer(AccelerometerModel::Bmi160))
            .module(Module::Accelerometer(AccelerometerModel::Bmi270))
            .build()
            .unwrap();
        assert_eq!(device.modules.len(), 1);
        assert_eq!(
            device.modules.get(&ModuleKind::Accelerometer),
            Some(&Module::Accelerometer(AccelerometerModel::Bmi270))
        );
    }

    #[test]
    fn should_order_by_name_case_insensitively_then_mac() {
        let a = DeviceMetadata::builder()
            .mac("FF:00")
            .name("alpha")
            .build()
            .unwrap();
        let b = DeviceMetadata::builder()
            .mac("AA:00")
            .name("Beta")
            .build()
            .unwrap();
        let c = DeviceMetadata::builder()
            .mac("BB:00")
            .name("beta")
            .build()
            .unwrap();

        let mut list = vec![c.clone(), b.clone(), a.clone()];
        list.sort();
        assert_eq!(list, vec![a, b, c]);
    }

    #[test]
    fn should_expose_metadata_from_both_known_device_variants() {
        let metadata = valid_device();
        let offline: KnownDevice<()> = KnownDevice::Known {
            metadata: metadata.clone(),
        };
        let online = KnownDevice::KnownAndReachable {
            metadata: metadata.clone(),
            handle: 7_u8,
        };

        assert_eq!(offline.metadata(), &metadata);
        assert_eq!(online.metadata(), &metadata);
        assert!(offline.handle().is_none());
        assert_eq!(online.handle(), Some(&7));
    }
}
