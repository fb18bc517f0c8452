use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::manager::VersionManager;
use crate::version::{FieldMap, Version};

/// An object whose data can be migrated between versions.
///
/// The engine never looks at anything but these two capabilities: the type
/// name selects which actions apply, the field map is what they transform.
pub trait Migratable {
    /// Stable identifier used as the key into each change's actions.
    fn type_name(&self) -> &str;

    /// The object's current data, laid out in the shape of the version it
    /// was produced under.
    fn data(&self) -> Result<FieldMap>;
}

/// Serialize any value into a field map.
///
/// Handy for [`Migratable::data`] implementations on `Serialize` types.
/// Fails with [`Error::NotAnObject`] when the value does not serialize to a
/// JSON object.
pub fn to_field_map<T: Serialize + ?Sized>(type_name: &str, value: &T) -> Result<FieldMap> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAnObject(type_name.to_string())),
    }
}

impl VersionManager {
    /// Migrate an object's data from `version` to the canonical shape.
    ///
    /// Every change of every version newer than `version` is visited oldest
    /// first; changes carrying an action for the object's type name apply it
    /// to the running field map. When `version` is already the latest, the
    /// object's map is returned as is.
    ///
    /// Fails with [`Error::UnknownVersion`] when `version` is not in this
    /// catalog; errors from [`Migratable::data`] are returned unchanged.
    pub fn apply<M: Migratable + ?Sized>(
        &self,
        version: &Version,
        object: &M,
    ) -> Result<FieldMap> {
        let type_name = object.type_name();
        let start = self.newer_than(version)?;
        let data = object.data()?;
        Ok(self.run_chain(start, type_name, data))
    }

    /// Migrate a bare field map that was produced under `version` for
    /// objects of `type_name`.
    pub fn apply_map(
        &self,
        version: &Version,
        type_name: &str,
        data: FieldMap,
    ) -> Result<FieldMap> {
        let start = self.newer_than(version)?;
        Ok(self.run_chain(start, type_name, data))
    }

    /// Migrate an object and deserialize the result into the canonical type.
    pub fn apply_into<T, M>(&self, version: &Version, object: &M) -> Result<T>
    where
        T: DeserializeOwned,
        M: Migratable + ?Sized,
    {
        let map = self.apply(version, object)?;
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Number of entries newer than `version`; they occupy `0..n` in the
    /// descending catalog.
    fn newer_than(&self, version: &Version) -> Result<usize> {
        self.position(version.date())
            .ok_or_else(|| Error::UnknownVersion(version.date().to_string()))
    }

    fn run_chain(&self, newer: usize, type_name: &str, mut data: FieldMap) -> FieldMap {
        for entry in self.entries[..newer].iter().rev() {
            for change in entry.version.changes() {
                if let Some(action) = change.action_for(type_name) {
                    trace!(
                        version = entry.version.date(),
                        type_name,
                        change = change.description(),
                        "applying migration action"
                    );
                    data = action(data);
                }
            }
        }
        data
    }
}
