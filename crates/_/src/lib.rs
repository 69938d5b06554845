//! # Lazybundle - Lazy Resource Bundle Loading for Rust
//! **A small coordinator for loading named bundles of resources and reacting once they complete**
//!
//! Resources (scripts, stylesheets, images or anything else addressable by path) are grouped
//! into bundles. Every `load` call fetches its resources through pluggable fetch engine and,
//! once all of them report back, publishes bundle result - the list of resources that failed.
//! Any code can subscribe to a set of bundles with `ready`, before or after they got defined,
//! and gets notified exactly once when all of them completed.
//!
//! ### Key Features:
//! - **Bundles**: Named or anonymous groups of resources, with per-bundle success and failure callbacks.
//! - **Ready Subscriptions**: Await any set of bundles, including ones that are not defined yet, with callbacks or futures.
//! - **Ordered Loads**: Fetch resources of a bundle one after another when their order matters.
//! - **Pluggable Fetching**: Immediate, deferred (background threads), future based and throttled engines over any `ResourceFetch`.
//! - **Passthrough Attributes**: Allow-listed request attributes such as `integrity` or `crossorigin` reach fetchers untouched.
//! - **Events And Progress**: Observe loader activity with event listeners and tracked loading progress.
//!
//! ### Example Usage:
//! ```rust
//! use lazybundle::{
//!     Loader,
//!     fetch::immediate::ImmediateFetch,
//!     request::{LoadRequest, ReadyOptions},
//! };
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let loader = Loader::default().with_fetch(ImmediateFetch::new([
//!         ("jquery.js", b"window.$ = {}".as_slice()),
//!         ("app.js", b"$.app = {}".as_slice()),
//!     ]));
//!
//!     loader.load(LoadRequest::new("jquery.js").bundle("jquery"))?;
//!     loader.ready(
//!         "jquery",
//!         ReadyOptions::default()
//!             .success(|| println!("jQuery is ready"))
//!             .error(|missing| println!("Missing bundles: {:?}", missing)),
//!     );
//!     loader.load(LoadRequest::new(["app.js", "widgets.js"]).bundle("app"))?;
//!
//!     while loader.is_busy() {
//!         loader.maintain()?;
//!     }
//!     assert!(loader.is_published("jquery"));
//!     assert_eq!(loader.bundle_result("app").unwrap(), vec!["widgets.js"]);
//!
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod request;

pub use crate::{
    bundle::id::BundleId, bundle::path::ResourcePath, config::LoaderConfig, error::LoaderError,
    loader::Loader,
};

pub mod third_party {
    pub use futures;
    pub use serde_json;
}
