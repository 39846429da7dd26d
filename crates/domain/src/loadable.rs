//! The aggregate persisted and loaded as a single unit.

use serde::{Deserialize, Serialize};

use crate::device::DeviceMetadata;
use crate::group::Group;

/// Everything the system persists: known devices, groups, and a shadow copy
/// of the previous group list.
///
/// Constructed empty when no persisted bytes exist anywhere, otherwise
/// reconstructed from decoded bytes on every load cycle, and replaced
/// wholesale on every save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownDevices {
    pub devices: Vec<DeviceMetadata>,
    pub groups: Vec<Group>,
    /// The last successfully-saved group list prior to the current one.
    ///
    /// A shadow copy so a consumer can detect and offer recovery from an
    /// unintended group-list wipe. Never restored automatically.
    pub groups_recovery: Vec<Group>,
}

impl KnownDevices {
    /// Replace the group list, moving the current list into the recovery
    /// shadow so the prior state stays recoverable for one more save cycle.
    #[must_use]
    pub fn replacing_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups_recovery = std::mem::replace(&mut self.groups, groups);
        self
    }

    /// Whether nothing at all has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.groups.is_empty() && self.groups_recovery.is_empty()
    }
}
