use crate::fetch::{FetchError, FetchRequest, ResourceFetch};
use std::collections::{BTreeMap, HashMap};

fn missing(request: &FetchRequest) -> FetchError {
    format!("Missing key: `{}`", request.path.path()).into()
}

impl<const N: usize> ResourceFetch for [(&'static str, &'static [u8]); N] {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.iter()
            .find(|(path, _)| *path == request.path.path())
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| missing(request))
    }
}

impl ResourceFetch for Vec<(String, Vec<u8>)> {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.iter()
            .find(|(path, _)| path == request.path.path())
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| missing(request))
    }
}

impl ResourceFetch for HashMap<String, Vec<u8>> {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.get(request.path.path())
            .cloned()
            .ok_or_else(|| missing(request))
    }
}

impl ResourceFetch for BTreeMap<String, Vec<u8>> {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.get(request.path.path())
            .cloned()
            .ok_or_else(|| missing(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_path_without_protocol_and_meta() {
        let fetch = [("theme.css", b"body{}".as_slice())];
        assert_eq!(
            fetch
                .fetch(&FetchRequest::new("css://theme.css?media=print"))
                .unwrap(),
            b"body{}"
        );
        let error = fetch.fetch(&FetchRequest::new("other.css")).unwrap_err();
        assert_eq!(error.to_string(), "Missing key: `other.css`");

        let fetch = vec![("a.js".to_owned(), b"a".to_vec())];
        assert!(fetch.fetch(&FetchRequest::new("a.js")).is_ok());
        assert!(fetch.fetch(&FetchRequest::new("b.js")).is_err());
    }
}
