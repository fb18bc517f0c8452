//! # pinned-axum
//!
//! [Axum](https://docs.rs/axum) integration for [`pinned`].
//!
//! Share the catalog as `Arc<VersionManager>` in the router state and either
//! take [`PinnedVersion`] as a handler argument, or wrap routes in
//! [`pin_version`] to resolve once per request and echo the resolved version
//! back in the response header.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{middleware, routing::get, Router};
//! use pinned::{Version, VersionManager};
//! use pinned_axum::{pin_version, PinnedVersion};
//!
//! async fn users(version: PinnedVersion) -> String {
//!     format!("pinned to {}", version.date())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut vm = VersionManager::new();
//!     vm.add(Version::new("2018-01-02")).unwrap();
//!     let catalog = Arc::new(vm);
//!
//!     let app = Router::new()
//!         .route("/users", get(users))
//!         .layer(middleware::from_fn_with_state(catalog.clone(), pin_version))
//!         .with_state(catalog);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:4242").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod extract;
mod rejection;

pub use extract::{pin_version, PinnedVersion};
pub use rejection::VersionRejection;
