//! Group — a named, user-defined collection of devices by MAC address.
//!
//! Membership references the stable hardware identifier rather than any
//! transient session identifier, so groups survive reconnections on other
//! host machines.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::device::MacAddress;
use crate::error::{ValidationError, WearSyncError};
use crate::id::GroupId;

/// A user-defined device grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Stable for the group's lifetime, unrelated to any device identifier.
    pub id: GroupId,
    /// Member devices by MAC address. A set: no duplicates, no order.
    pub members: BTreeSet<MacAddress>,
    /// User-assigned display name.
    pub name: String,
}

impl Group {
    /// Create a builder for constructing a [`Group`].
    #[must_use]
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WearSyncError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), WearSyncError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Ordering for display lists: case-insensitive name, then id.
impl Ord for Group {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_name = self
            .name
            .to_lowercase()
            .cmp(&other.name.to_lowercase());
        if by_name != Ordering::Equal {
            return by_name;
        }
        self.id.cmp(&other.id)
    }
}

impl PartialOrd for Group {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Union of the MAC addresses referenced by any group in the slice.
#[must_use]
pub fn all_member_macs(groups: &[Group]) -> BTreeSet<MacAddress> {
    groups
        .iter()
        .flat_map(|group| group.members.iter().cloned())
        .collect()
}

/// Step-by-step builder for [`Group`].
#[derive(Debug, Default)]
pub struct GroupBuilder {
    id: Option<GroupId>,
    members: BTreeSet<MacAddress>,
    name: Option<String>,
}

impl GroupBuilder {
    #[must_use]
    pub fn id(mut self, id: GroupId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn member(mut self, mac: impl Into<MacAddress>) -> Self {
        self.members.insert(mac.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Consume the builder, validate, and return a [`Group`].
    ///
    /// # Errors
    ///
    /// Returns [`WearSyncError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Group, WearSyncError> {
        let group = Group {
            id: self.id.unwrap_or_default(),
            members: self.members,
            name: self.name.unwrap_or_default(),
        };
        group.validate()?;
        Ok(group)
    }
}
