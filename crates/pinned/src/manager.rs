use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Error, Result};
use crate::version::{parse_date, Version};

/// Names of the request fields a client pins its version with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Query parameter carrying the version date.
    pub query_param: String,
    /// Header carrying the version date.
    pub header: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_param: "v".to_string(),
            header: "Version".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) date: NaiveDate,
    pub(crate) version: Version,
}

/// Owns the catalog of versions, newest first.
///
/// The catalog is built once at startup with [`add`](Self::add) and then
/// shared read-only: [`resolve`](Self::resolve) and [`apply`](Self::apply)
/// take `&self`, so an `Arc<VersionManager>` can serve any number of
/// concurrent requests without locking.
///
/// # Example
///
/// ```
/// use pinned::{Change, Version, VersionManager};
///
/// let mut vm = VersionManager::new();
/// vm.add(Version::new("2016-01-02")).unwrap();
/// vm.add(Version::new("2017-01-02").change(Change::new("Rename B to A.").action(
///     "TestObject",
///     |mut m| {
///         if let Some(b) = m.remove("B") {
///             m.insert("A".into(), b);
///         }
///         m
///     },
/// )))
/// .unwrap();
///
/// assert_eq!(vm.versions(), ["2017-01-02", "2016-01-02"]);
/// assert_eq!(vm.latest().unwrap().date(), "2017-01-02");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionManager {
    // Sorted by date, strictly descending.
    pub(crate) entries: Vec<Entry>,
    pub(crate) config: ResolverConfig,
}

impl VersionManager {
    /// Create an empty catalog using the default `v` / `Version` names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog reading versions from custom request fields.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Register a version.
    ///
    /// Fails with [`Error::InvalidDate`] when the date is not `YYYY-MM-DD`
    /// and with [`Error::DuplicateVersion`] when the date is taken. In both
    /// cases the catalog is left untouched.
    pub fn add(&mut self, version: Version) -> Result<()> {
        let date = parse_date(version.date())?;
        // Descending order, so compare the probe against the new date.
        let idx = match self.entries.binary_search_by(|probe| date.cmp(&probe.date)) {
            Ok(_) => return Err(Error::DuplicateVersion(version.date().to_string())),
            Err(idx) => idx,
        };
        debug!(
            version = version.date(),
            changes = version.changes().len(),
            deprecated = version.is_deprecated(),
            "registered API version"
        );
        self.entries.insert(idx, Entry { date, version });
        Ok(())
    }

    /// All registered dates, newest first, deprecated ones included.
    pub fn versions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.version.date()).collect()
    }

    /// The most recent version, or `None` for an empty catalog.
    pub fn latest(&self) -> Option<&Version> {
        self.entries.first().map(|e| &e.version)
    }

    /// Look up a version by its exact date string.
    pub fn get(&self, date: &str) -> Option<&Version> {
        self.position(date).map(|idx| &self.entries[idx].version)
    }

    /// Iterate over versions, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.entries.iter().map(|e| &e.version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark a registered version as deprecated.
    ///
    /// Deprecated versions stay resolvable by lookup but are refused by
    /// [`resolve`](Self::resolve).
    pub fn deprecate(&mut self, date: &str) -> Result<()> {
        let idx = self
            .position(date)
            .ok_or_else(|| Error::UnknownVersion(date.to_string()))?;
        self.entries[idx].version.set_deprecated(true);
        debug!(version = date, "deprecated API version");
        Ok(())
    }

    /// Index of `date` in the descending catalog.
    pub(crate) fn position(&self, date: &str) -> Option<usize> {
        let parsed = parse_date(date).ok()?;
        self.entries
            .binary_search_by(|probe| parsed.cmp(&probe.date))
            .ok()
    }
}
