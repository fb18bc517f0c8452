//! Convenient re-exports of the types most services need.
//!
//! ```
//! use pinned::prelude::*;
//! ```

pub use crate::{Candidates, Change, FieldMap, Migratable, Version, VersionManager, VersionSource};
