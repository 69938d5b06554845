use serde::{Deserialize, Serialize};
use std::{borrow::Cow, ops::Range};

/// Kind of resource a path points to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[default]
    Script,
    Stylesheet,
    Image,
}

impl ResourceKind {
    fn from_protocol(protocol: &str) -> Option<Self> {
        match protocol {
            "js" => Some(Self::Script),
            "css" => Some(Self::Stylesheet),
            "img" => Some(Self::Image),
            _ => None,
        }
    }

    fn from_extension(path: &str) -> Option<Self> {
        let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "js" | "mjs" => Some(Self::Script),
            "css" => Some(Self::Stylesheet),
            "png" | "gif" | "jpg" | "jpeg" | "svg" | "webp" | "avif" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }

    /// Conventional MIME type used to request resources of this kind.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Script => "application/javascript",
            Self::Stylesheet => "text/css",
            Self::Image => "image/*",
        }
    }
}

/// Path of a single resource, in form of: `protocol://path/to/file.ext?key=value&flag`.
///
/// Both protocol and meta parts are optional. Protocol, when one of `js`, `css`
/// or `img`, explicitly tells the resource kind - otherwise it is guessed from
/// the file extension, falling back to script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourcePath {
    content: Cow<'static, str>,
    protocol: usize,
    path: Range<usize>,
    meta: Range<usize>,
}

impl ResourcePath {
    pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
        let content: Cow<'static, str> = content.into();
        let (protocol, path_start) = if let Some(index) = content.find("://") {
            (index, index + b"://".len())
        } else {
            (0, 0)
        };
        let (path_end, meta) = if let Some(path_end) = content[path_start..].find('?') {
            let path_end = path_start + path_end;
            (path_end, (path_end + b"?".len())..content.len())
        } else {
            (content.len(), content.len()..content.len())
        };
        Self {
            content,
            protocol,
            path: path_start..path_end,
            meta,
        }
    }

    /// Whole path text exactly as it was given.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn protocol(&self) -> &str {
        &self.content[0..self.protocol]
    }

    pub fn path(&self) -> &str {
        &self.content[self.path.clone()]
    }

    pub fn path_parts(&self) -> impl Iterator<Item = &str> {
        self.path().split(&['/', '\\'])
    }

    pub fn meta(&self) -> &str {
        &self.content[self.meta.clone()]
    }

    /// Iterates over `key=value` pairs of meta part. Keys without value yield
    /// empty value.
    pub fn meta_items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta()
            .split('&')
            .filter(|item| !item.is_empty())
            .map(|item| item.split_once('=').unwrap_or((item, "")))
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_protocol(self.protocol())
            .or_else(|| ResourceKind::from_extension(self.path()))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&'static str> for ResourcePath {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&String> for ResourcePath {
    fn from(value: &String) -> Self {
        Self::new(value.to_owned())
    }
}

impl From<ResourcePath> for String {
    fn from(value: ResourcePath) -> Self {
        value.content.into_owned()
    }
}

impl PartialEq<str> for ResourcePath {
    fn eq(&self, other: &str) -> bool {
        self.content() == other
    }
}

impl PartialEq<&str> for ResourcePath {
    fn eq(&self, other: &&str) -> bool {
        self.content() == *other
    }
}

/// Conversion of "one path or a list of paths" arguments into a list of paths.
pub trait IntoResourcePaths {
    fn into_resource_paths(self) -> Vec<ResourcePath>;
}

impl IntoResourcePaths for ResourcePath {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        vec![self]
    }
}

impl IntoResourcePaths for &'static str {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        vec![self.into()]
    }
}

impl IntoResourcePaths for String {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        vec![self.into()]
    }
}

impl<T: Into<ResourcePath>> IntoResourcePaths for Vec<T> {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<ResourcePath>, const N: usize> IntoResourcePaths for [T; N] {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<ResourcePath> + Clone> IntoResourcePaths for &[T] {
    fn into_resource_paths(self) -> Vec<ResourcePath> {
        self.iter().cloned().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parts() {
        let path = ResourcePath::new("css://themes/dark.css?media=print&nonce");
        assert_eq!(path.protocol(), "css");
        assert_eq!(path.path(), "themes/dark.css");
        assert_eq!(path.meta(), "media=print&nonce");
        assert_eq!(
            path.meta_items().collect::<Vec<_>>(),
            vec![("media", "print"), ("nonce", "")]
        );
        assert_eq!(path.path_parts().collect::<Vec<_>>(), vec!["themes", "dark.css"]);
        assert_eq!(path.to_string(), "css://themes/dark.css?media=print&nonce");

        let path = ResourcePath::new("vendor/lib.js");
        assert_eq!(path.protocol(), "");
        assert_eq!(path.path(), "vendor/lib.js");
        assert_eq!(path.meta(), "");
        assert_eq!(path.meta_items().count(), 0);
    }

    #[test]
    fn test_url_paths() {
        let path = ResourcePath::new("https://cdn.example.com/lib.min.js?v=2");
        assert_eq!(path.protocol(), "https");
        assert_eq!(path.path(), "cdn.example.com/lib.min.js");
        assert_eq!(path.kind(), ResourceKind::Script);
    }

    #[test]
    fn test_resource_kind() {
        assert_eq!(ResourcePath::new("a.css").kind(), ResourceKind::Stylesheet);
        assert_eq!(ResourcePath::new("a/b.PNG").kind(), ResourceKind::Image);
        assert_eq!(ResourcePath::new("css://style").kind(), ResourceKind::Stylesheet);
        assert_eq!(ResourcePath::new("img://logo").kind(), ResourceKind::Image);
        assert_eq!(ResourcePath::new("js://theme.css").kind(), ResourceKind::Script);
        assert_eq!(ResourcePath::new("noextension").kind(), ResourceKind::Script);
    }

    #[test]
    fn test_into_resource_paths() {
        assert_eq!("a.js".into_resource_paths(), vec![ResourcePath::new("a.js")]);
        assert_eq!(
            vec!["a.js".to_owned(), "b.js".to_owned()].into_resource_paths(),
            vec![ResourcePath::new("a.js"), ResourcePath::new("b.js")]
        );
        let json = serde_json::to_string(&ResourcePath::new("a.js?x=1")).unwrap();
        assert_eq!(json, r#""a.js?x=1""#);
        let path: ResourcePath = serde_json::from_str(&json).unwrap();
        assert_eq!(path.meta(), "x=1");
    }
}
