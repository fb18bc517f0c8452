//! Catalog files.
//!
//! A catalog can be declared in TOML instead of code. Actions are limited to
//! a few declarative field operations; anything richer is registered in
//! code with [`Change::action`].
//!
//! ```toml
//! [resolver]
//! query_param = "v"
//! header = "Version"
//!
//! [[version]]
//! date = "2017-01-02"
//! deprecated = true
//!
//! [[version]]
//! date = "2018-01-02"
//!
//! [[version.change]]
//! description = "Rename B to A."
//!
//! [[version.change.action]]
//! type = "TestObject"
//! op = "rename"
//! from = "B"
//! to = "A"
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::manager::{ResolverConfig, VersionManager};
use crate::version::{Change, FieldMap, Version};

/// Top-level structure of a catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    /// Request field names (optional).
    pub resolver: Option<ResolverSection>,
    /// Version definitions, in any order.
    #[serde(rename = "version", default)]
    pub versions: Vec<VersionDef>,
}

/// Overrides for the request fields the resolver reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    pub query_param: Option<String>,
    pub header: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDef {
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(rename = "change", default)]
    pub changes: Vec<ChangeDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeDef {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "action", default)]
    pub actions: Vec<ActionDef>,
}

/// A declarative action bound to one object type.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDef {
    /// Object type name the action applies to.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(flatten)]
    pub op: FieldOp,
}

/// Field operations available to catalog files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldOp {
    /// Move a field's value to a new name. A missing source is a no-op.
    Rename { from: String, to: String },
    /// Drop a field.
    Remove { field: String },
    /// Insert a value when the field is absent.
    Default { field: String, value: toml::Value },
}

impl FieldOp {
    /// Run the operation against a field map.
    pub fn apply(&self, mut map: FieldMap) -> FieldMap {
        match self {
            FieldOp::Rename { from, to } => {
                if let Some(value) = map.remove(from) {
                    map.insert(to.clone(), value);
                }
            }
            FieldOp::Remove { field } => {
                map.remove(field);
            }
            FieldOp::Default { field, value } => {
                if !map.contains_key(field) {
                    map.insert(field.clone(), toml_to_json(value));
                }
            }
        }
        map
    }
}

fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Value::from(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

impl CatalogFile {
    /// Parse a catalog from TOML source.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Build a manager holding every declared version.
    ///
    /// Fails on the first invalid or duplicate date.
    pub fn into_manager(self) -> Result<VersionManager> {
        let mut config = ResolverConfig::default();
        if let Some(section) = self.resolver {
            if let Some(query_param) = section.query_param {
                config.query_param = query_param;
            }
            if let Some(header) = section.header {
                config.header = header;
            }
        }
        if config.query_param.is_empty() {
            return Err(Error::Config(
                "resolver query parameter must not be empty".to_string(),
            ));
        }
        if let Err(e) = http::HeaderName::from_bytes(config.header.as_bytes()) {
            return Err(Error::Config(format!(
                "resolver header {:?} is not a valid header name: {e}",
                config.header
            )));
        }

        let mut vm = VersionManager::with_config(config);
        for def in self.versions {
            vm.add(def.into_version())?;
        }
        Ok(vm)
    }
}

impl VersionDef {
    fn into_version(self) -> Version {
        self.changes.into_iter().fold(
            Version::new(self.date).deprecated(self.deprecated),
            |version, change| version.change(change.into_change()),
        )
    }
}

impl ChangeDef {
    fn into_change(self) -> Change {
        // Several ops for one type compose in file order.
        let mut grouped: Vec<(String, Vec<FieldOp>)> = Vec::new();
        for ActionDef { type_name, op } in self.actions {
            match grouped.iter_mut().find(|(t, _)| *t == type_name) {
                Some((_, ops)) => ops.push(op),
                None => grouped.push((type_name, vec![op])),
            }
        }
        grouped
            .into_iter()
            .fold(Change::new(self.description), |change, (type_name, ops)| {
                change.action(type_name, move |map| {
                    ops.iter().fold(map, |map, op| op.apply(map))
                })
            })
    }
}

impl VersionManager {
    /// Build a manager from a TOML catalog file.
    pub fn from_toml(source: &str) -> Result<Self> {
        CatalogFile::parse(source)?.into_manager()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CATALOG: &str = r#"
        [resolver]
        header = "X-Api-Version"

        [[version]]
        date = "2016-01-02"

        [[version]]
        date = "2018-01-02"

        [[version.change]]
        description = "Rename B to A."

        [[version.change.action]]
        type = "TestObject"
        op = "rename"
        from = "B"
        to = "A"

        [[version.change.action]]
        type = "TestObject"
        op = "default"
        field = "tags"
        value = ["new"]

        [[version]]
        date = "2017-01-02"
        deprecated = true

        [[version.change]]
        description = "Drop legacy flag."

        [[version.change.action]]
        type = "TestObject"
        op = "remove"
        field = "legacy"
    "#;

    #[test]
    fn loads_catalog_in_order() {
        let vm = VersionManager::from_toml(CATALOG).unwrap();
        assert_eq!(vm.versions(), ["2018-01-02", "2017-01-02", "2016-01-02"]);
        assert!(vm.get("2017-01-02").unwrap().is_deprecated());
        assert_eq!(vm.config().header, "X-Api-Version");
        assert_eq!(vm.config().query_param, "v");
    }

    #[test]
    fn declared_actions_migrate() {
        let vm = VersionManager::from_toml(CATALOG).unwrap();
        let mut data = FieldMap::new();
        data.insert("B".into(), json!("Foo"));
        data.insert("legacy".into(), json!(true));

        let oldest = vm.get("2016-01-02").unwrap();
        let out = vm.apply_map(oldest, "TestObject", data).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({ "A": "Foo", "tags": ["new"] })
        );
    }

    #[test]
    fn field_ops() {
        let mut map = FieldMap::new();
        map.insert("x".into(), json!(1));

        let renamed = FieldOp::Rename {
            from: "missing".into(),
            to: "y".into(),
        }
        .apply(map.clone());
        assert_eq!(renamed, map);

        let defaulted = FieldOp::Default {
            field: "x".into(),
            value: toml::Value::Integer(5),
        }
        .apply(map.clone());
        assert_eq!(defaulted.get("x"), Some(&json!(1)));

        let removed = FieldOp::Remove { field: "x".into() }.apply(map);
        assert!(removed.is_empty());
    }

    #[test]
    fn bad_date_in_file() {
        let err = VersionManager::from_toml("[[version]]\ndate = \"soon\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
    }

    #[test]
    fn duplicate_date_in_file() {
        let source = "[[version]]\ndate = \"2017-01-02\"\n[[version]]\ndate = \"2017-01-02\"\n";
        let err = VersionManager::from_toml(source).unwrap_err();
        assert!(matches!(err, Error::DuplicateVersion(_)));
    }

    #[test]
    fn unknown_op_is_config_error() {
        let source = r#"
            [[version]]
            date = "2017-01-02"
            [[version.change]]
            [[version.change.action]]
            type = "T"
            op = "explode"
        "#;
        let err = VersionManager::from_toml(source).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_field_names_are_rejected() {
        let err = VersionManager::from_toml("[resolver]\nheader = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = VersionManager::from_toml("[resolver]\nquery_param = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn illegal_header_name_is_rejected() {
        let source = "[resolver]\nheader = \"Bad Header\"\n";
        let err = VersionManager::from_toml(source).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("Bad Header")));
    }
}
