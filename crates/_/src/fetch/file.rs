use crate::fetch::{FetchError, FetchRequest, ResourceFetch};
use std::path::{Path, PathBuf};

fn load_file(file_path: &Path) -> Result<Vec<u8>, FetchError> {
    std::fs::read(file_path)
        .map_err(|error| format!("Failed to load `{:?}` file bytes: {}", file_path, error).into())
}

/// Loads resources from the file system, treating resource paths as absolute.
#[derive(Debug, Default, Clone)]
pub struct AbsoluteFileResourceFetch;

impl ResourceFetch for AbsoluteFileResourceFetch {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        load_file(Path::new(request.path.path()))
    }
}

/// Loads resources from the file system, relative to root directory.
#[derive(Debug, Default, Clone)]
pub struct FileResourceFetch {
    pub root: PathBuf,
}

impl FileResourceFetch {
    /// Sets the root directory that resource paths are resolved against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}

impl ResourceFetch for FileResourceFetch {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        load_file(&self.root.join(request.path.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_fetch() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("vendor")).unwrap();
        std::fs::write(root.path().join("vendor/lib.js"), b"lib()").unwrap();

        let fetch = FileResourceFetch::default().with_root(root.path());
        assert_eq!(
            fetch.fetch(&FetchRequest::new("js://vendor/lib.js")).unwrap(),
            b"lib()"
        );
        assert!(fetch.fetch(&FetchRequest::new("vendor/missing.js")).is_err());

        let absolute = root.path().join("vendor/lib.js");
        let request = FetchRequest::new(absolute.to_string_lossy().into_owned());
        assert_eq!(AbsoluteFileResourceFetch.fetch(&request).unwrap(), b"lib()");
    }
}
