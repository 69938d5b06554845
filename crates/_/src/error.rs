use crate::bundle::id::BundleId;
use thiserror::Error;

/// Errors produced by the loader and its building blocks.
///
/// Resources that fail to load are never reported through this type - they end
/// up in the not-found lists passed to failure callbacks instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Bundle with this id was already defined by an earlier `load` call.
    #[error("bundle `{0}` is already defined")]
    DuplicateBundle(BundleId),
    /// Bundle with this id already published its result.
    #[error("bundle `{0}` has already published its result")]
    AlreadyPublished(BundleId),
    /// Positional load arguments could not be resolved into a request.
    #[error("invalid load argument: {0}")]
    InvalidArgument(String),
    /// Loader has no fetch engine installed.
    #[error("there is no fetch engine installed in loader")]
    MissingFetchEngine,
    /// Fetch engine failed during maintenance.
    #[error("fetch engine failure: {0}")]
    Fetch(String),
    /// Awaited bundles resolved with missing resources.
    #[error("missing dependencies: {0:?}")]
    MissingDependencies(Vec<BundleId>),
    /// Awaiting future got dropped by the loader before resolution.
    #[error("bundle subscription was canceled")]
    Canceled,
    /// Configuration could not be parsed.
    #[error("invalid loader config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LoaderError::DuplicateBundle(_) => "duplicate_bundle",
            LoaderError::AlreadyPublished(_) => "already_published",
            LoaderError::InvalidArgument(_) => "invalid_argument",
            LoaderError::MissingFetchEngine => "missing_fetch_engine",
            LoaderError::Fetch(_) => "fetch",
            LoaderError::MissingDependencies(_) => "missing_dependencies",
            LoaderError::Canceled => "canceled",
            LoaderError::Config(_) => "config",
            LoaderError::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(error: serde_json::Error) -> Self {
        LoaderError::Config(error.to_string())
    }
}
