use crate::fetch::{FetchError, FetchRequest, ResourceFetch};

/// Resource fetch backed by a user closure.
pub struct ClosureResourceFetch {
    #[allow(clippy::type_complexity)]
    fetch: Box<dyn Fn(&FetchRequest) -> Result<Vec<u8>, FetchError> + Send + Sync>,
}

impl ClosureResourceFetch {
    pub fn new(
        fetch: impl Fn(&FetchRequest) -> Result<Vec<u8>, FetchError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            fetch: Box::new(fetch),
        }
    }
}

impl ResourceFetch for ClosureResourceFetch {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        (self.fetch)(request)
    }
}
