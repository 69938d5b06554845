use lazybundle::fetch::{FetchError, FetchRequest, ResourceFetch};
use reqwest::{
    Url,
    blocking::Client,
    header::{ACCEPT, HeaderValue},
};
use std::error::Error;

pub mod third_party {
    pub use reqwest;
}

/// Fetches resources over HTTP, resolving resource paths against root URL.
///
/// Requests are blocking, so this fetch should be wrapped in a background
/// engine such as `DeferredFetch`.
pub struct HttpResourceFetch {
    root: Url,
    client: Client,
}

impl HttpResourceFetch {
    pub fn new(root: &str) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            root: root.parse()?,
            client: Client::builder().build()?,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Resolves URL of requested resource. Path meta part becomes URL query.
    pub fn url(&self, request: &FetchRequest) -> Result<Url, FetchError> {
        let mut url = self.root.join(request.path.path()).map_err(|error| {
            format!(
                "Failed to join root URL: `{}` with path: `{}`. Error: {}",
                self.root, request.path, error
            )
        })?;
        let meta = request.path.meta();
        if !meta.is_empty() {
            url.set_query(Some(meta));
        }
        Ok(url)
    }
}

impl ResourceFetch for HttpResourceFetch {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let url = self.url(request)?;
        tracing::debug!("Fetching `{}` from `{}`", request.path, url);
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static(request.kind.mime_type()))
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| {
                format!(
                    "Failed to get HTTP content from: `{}`. Error: {}",
                    url, error
                )
            })?;
        let bytes = response.bytes().map_err(|error| {
            format!(
                "Failed to read bytes response from: `{}`. Error: {}",
                url, error
            )
        })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution() {
        let fetch = HttpResourceFetch::new("https://cdn.example.com/assets/").unwrap();
        assert_eq!(
            fetch.url(&FetchRequest::new("vendor/jquery.js")).unwrap().as_str(),
            "https://cdn.example.com/assets/vendor/jquery.js"
        );
        assert_eq!(
            fetch
                .url(&FetchRequest::new("css://theme.css?v=3"))
                .unwrap()
                .as_str(),
            "https://cdn.example.com/assets/theme.css?v=3"
        );
        assert_eq!(
            fetch.url(&FetchRequest::new("/root.js")).unwrap().as_str(),
            "https://cdn.example.com/root.js"
        );
    }

    #[test]
    fn test_invalid_root() {
        assert!(HttpResourceFetch::new("not a url").is_err());
    }
}
