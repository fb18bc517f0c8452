//! # pinned
//!
//! Date-pinned API versioning.
//!
//! A service keeps one canonical data model and a catalog of dated versions
//! describing how older layouts differ from it. Clients pin themselves to a
//! version through a query parameter (`v`) or a header (`Version`); `pinned`
//! resolves which version a request targets and migrates payloads written
//! against an older layout into the canonical shape.
//!
//! ## How It Works
//!
//! 1. At startup, versions are registered with [`VersionManager::add`]. The
//!    catalog stays sorted newest first.
//! 2. Per request, [`VersionManager::resolve`] picks the pinned version:
//!    unknown dates are rejected, the newer of two valid candidates wins,
//!    deprecated versions are refused.
//! 3. [`VersionManager::apply`] walks every version newer than the starting
//!    one, oldest first, running the actions registered for the object's
//!    type name.
//!
//! ## Quick Start
//!
//! ```
//! use pinned::prelude::*;
//! use serde_json::json;
//!
//! struct User {
//!     name: String,
//! }
//!
//! impl Migratable for User {
//!     fn type_name(&self) -> &str {
//!         "User"
//!     }
//!
//!     fn data(&self) -> pinned::Result<FieldMap> {
//!         let mut m = FieldMap::new();
//!         m.insert("name".into(), json!(self.name));
//!         Ok(m)
//!     }
//! }
//!
//! let mut vm = VersionManager::new();
//! vm.add(Version::new("2017-01-02")).unwrap();
//! vm.add(Version::new("2018-01-02").change(
//!     Change::new("`name` became `full_name`.").action("User", |mut m| {
//!         if let Some(v) = m.remove("name") {
//!             m.insert("full_name".into(), v);
//!         }
//!         m
//!     }),
//! ))
//! .unwrap();
//!
//! let version = vm.resolve(&Candidates::query("2017-01-02")).unwrap();
//! let data = vm.apply(version, &User { name: "Ada".into() }).unwrap();
//! assert_eq!(data["full_name"], json!("Ada"));
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut self`, resolution and migration take `&self`.
//! Build the catalog first, then share it behind an `Arc`.

mod error;
mod manager;
mod migrate;
mod resolve;
mod version;

#[cfg(feature = "config")]
pub mod config;
pub mod prelude;

pub use error::{Error, Result};
pub use manager::{ResolverConfig, VersionManager};
pub use migrate::{to_field_map, Migratable};
pub use resolve::{Candidates, VersionSource};
pub use version::{parse_date, Action, Change, FieldMap, Version, DATE_FORMAT};
