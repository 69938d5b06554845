pub mod closure;
pub mod collections;
pub mod deferred;
pub mod file;
pub mod future;
pub mod immediate;
pub mod throttled;

use crate::bundle::path::{ResourceKind, ResourcePath};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, error::Error};

/// Error type of single resource fetch. It has to cross thread boundaries,
/// since deferred engines run fetches on background threads.
pub type FetchError = Box<dyn Error + Send + Sync>;

/// Attribute keys that are passed through to fetchers. Any other key given in
/// load options is silently dropped.
pub const ALLOWED_ATTRIBUTES: [&str; 7] = [
    "charset",
    "crossorigin",
    "integrity",
    "media",
    "nonce",
    "referrerpolicy",
    "type",
];

/// Passthrough attributes of a resource request, restricted to [`ALLOWED_ATTRIBUTES`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ResourceAttributes {
    items: BTreeMap<String, String>,
}

impl ResourceAttributes {
    pub fn is_allowed(key: &str) -> bool {
        ALLOWED_ATTRIBUTES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(key))
    }

    pub fn with(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Sets attribute value if key is allowed.
    ///
    /// # Returns
    /// `true` if attribute got stored, `false` if key is not on the allow-list.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl ToString) -> bool {
        let key = key.as_ref();
        if !Self::is_allowed(key) {
            tracing::debug!("Ignoring resource attribute `{}`", key);
            return false;
        }
        self.items.insert(key.to_ascii_lowercase(), value.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .get(&key.to_ascii_lowercase())
            .map(|value| value.as_str())
    }

    /// Overrides attributes with ones from `other`.
    pub fn merge(&mut self, other: &Self) {
        self.items
            .extend(other.items.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for ResourceAttributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Self::default();
        for (key, value) in iter {
            result.set(key, value);
        }
        result
    }
}

impl From<BTreeMap<String, String>> for ResourceAttributes {
    fn from(value: BTreeMap<String, String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ResourceAttributes> for BTreeMap<String, String> {
    fn from(value: ResourceAttributes) -> Self {
        value.items
    }
}

/// Identifies single started fetch, unique within one loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn index(self) -> u64 {
        self.0
    }
}

/// Everything fetcher needs to know to load one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub path: ResourcePath,
    pub kind: ResourceKind,
    /// `false` means resources of the same load are fetched one after another.
    pub asynchronous: bool,
    pub attributes: ResourceAttributes,
}

impl FetchRequest {
    pub fn new(path: impl Into<ResourcePath>) -> Self {
        let path = path.into();
        Self {
            kind: path.kind(),
            path,
            asynchronous: true,
            attributes: Default::default(),
        }
    }

    pub fn attributes(mut self, attributes: ResourceAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn asynchronous(mut self, value: bool) -> Self {
        self.asynchronous = value;
        self
    }
}

/// Successfully loaded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: ResourcePath,
    pub kind: ResourceKind,
    pub attributes: ResourceAttributes,
    pub bytes: Vec<u8>,
}

/// Outcome of single fetch, reported back by fetch engine.
#[derive(Debug)]
pub struct FetchReport {
    pub ticket: FetchTicket,
    pub path: ResourcePath,
    pub result: Result<Resource, FetchError>,
}

impl FetchReport {
    pub fn new(
        ticket: FetchTicket,
        request: FetchRequest,
        result: Result<Vec<u8>, FetchError>,
    ) -> Self {
        let path = request.path.clone();
        Self {
            ticket,
            path,
            result: result.map(|bytes| Resource {
                path: request.path,
                kind: request.kind,
                attributes: request.attributes,
                bytes,
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Performs actual load of a single resource.
///
/// Implementors only fetch - scheduling and completion reporting is done by
/// [`FetchEngine`] that wraps them.
pub trait ResourceFetch: Send + Sync + 'static {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError>;
}

impl<Fetch: ResourceFetch> ResourceFetch for std::sync::Arc<Fetch> {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.as_ref().fetch(request)
    }
}

/// Schedules fetches and reports their completion to the loader.
///
/// Completions are only ever collected by [`FetchEngine::maintain`], even when
/// engine finished its work right inside [`FetchEngine::start`].
pub trait FetchEngine: 'static {
    /// Starts fetching resource. Returning error means this resource is failed.
    fn start(&mut self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError>;

    /// Collects reports of fetches that completed since last maintenance.
    fn maintain(&mut self, reports: &mut Vec<FetchReport>) -> Result<(), Box<dyn Error>>;

    /// Number of fetches started but not yet reported.
    fn in_flight(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_allow_list() {
        let attributes = [
            ("integrity", "sha384-abc"),
            ("CrossOrigin", "anonymous"),
            ("onload", "alert(1)"),
            ("async", "false"),
        ]
        .into_iter()
        .collect::<ResourceAttributes>();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.get("crossorigin"), Some("anonymous"));
        assert_eq!(attributes.get("integrity"), Some("sha384-abc"));
        assert_eq!(attributes.get("onload"), None);

        let mut attributes = attributes;
        assert!(!attributes.set("src", "evil.js"));
        attributes.merge(&ResourceAttributes::default().with("integrity", "sha384-def"));
        assert_eq!(attributes.get("integrity"), Some("sha384-def"));
    }

    #[test]
    fn test_attributes_deserialize_filters() {
        let attributes: ResourceAttributes =
            serde_json::from_str(r#"{"nonce": "n1", "defer": "true"}"#).unwrap();
        assert_eq!(attributes.iter().collect::<Vec<_>>(), vec![("nonce", "n1")]);
    }

    #[test]
    fn test_report_builds_resource() {
        let request = FetchRequest::new("css://theme.css")
            .attributes(ResourceAttributes::default().with("media", "print"));
        let report = FetchReport::new(FetchTicket::new(3), request, Ok(b"body{}".to_vec()));
        assert!(report.is_loaded());
        let resource = report.result.unwrap();
        assert_eq!(resource.kind, ResourceKind::Stylesheet);
        assert_eq!(resource.attributes.get("media"), Some("print"));
        assert_eq!(resource.bytes, b"body{}");
    }
}
