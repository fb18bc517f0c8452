use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Format every version date uses.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An object's data as a map from field name to arbitrary JSON value.
pub type FieldMap = Map<String, Value>;

/// A transform from one field layout to the next for a single object type.
///
/// Actions must be pure: they see only the map handed to them.
pub type Action = Arc<dyn Fn(FieldMap) -> FieldMap + Send + Sync>;

/// Parse a version date, accepting only the zero-padded `YYYY-MM-DD` form.
///
/// Round-tripping through [`DATE_FORMAT`] rejects inputs such as
/// `2017-1-2` that chrono would otherwise accept, so the date a client sends
/// is always byte-identical to the one the catalog reports.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|e| Error::InvalidDate {
        date: date.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.format(DATE_FORMAT).to_string() != date {
        return Err(Error::InvalidDate {
            date: date.to_string(),
            reason: format!("expected {}", parsed.format(DATE_FORMAT)),
        });
    }
    Ok(parsed)
}

/// A described delta introduced by a version.
///
/// Each action says: when migrating an object whose type name is the key,
/// run this transform at this point in the chain.
#[derive(Clone, Default)]
pub struct Change {
    description: String,
    actions: HashMap<String, Action>,
}

impl Change {
    /// Create a change with no actions.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: HashMap::new(),
        }
    }

    /// Register the transform for `type_name`, replacing any previous one.
    pub fn action<F>(mut self, type_name: impl Into<String>, action: F) -> Self
    where
        F: Fn(FieldMap) -> FieldMap + Send + Sync + 'static,
    {
        self.actions.insert(type_name.into(), Arc::new(action));
        self
    }

    /// Register an already shared transform for `type_name`.
    pub fn shared_action(mut self, type_name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(type_name.into(), action);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The transform registered for `type_name`, if any.
    pub fn action_for(&self, type_name: &str) -> Option<&Action> {
        self.actions.get(type_name)
    }

    /// Type names this change has transforms for, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.type_names().collect();
        types.sort_unstable();
        f.debug_struct("Change")
            .field("description", &self.description)
            .field("actions", &types)
            .finish()
    }
}

/// A dated snapshot of the data model's shape.
///
/// The date is validated when the version is added to a
/// [`VersionManager`](crate::VersionManager), not when it is built.
#[derive(Debug, Clone)]
pub struct Version {
    date: String,
    deprecated: bool,
    changes: Vec<Change>,
}

impl Version {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            deprecated: false,
            changes: Vec::new(),
        }
    }

    /// Mark the version as deprecated (or not).
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Append a change. Changes run in the order they were added.
    pub fn change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub(crate) fn set_deprecated(&mut self, deprecated: bool) {
        self.deprecated = deprecated;
    }
}
