use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Identifier of a bundle - a named group of resources tracked as a single
/// completion unit.
///
/// Named ids are chosen by the caller, anonymous ids are allocated by the
/// loader for loads that were not given any name. Both live in separate
/// variants so they never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleId {
    Named(Cow<'static, str>),
    Anonymous(u64),
}

impl BundleId {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Named(name.into())
    }

    /// Tells if this id means "no bundle" - empty names are never published.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Named(name) if name.is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Anonymous(_) => None,
        }
    }
}

impl std::fmt::Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Anonymous(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&'static str> for BundleId {
    fn from(value: &'static str) -> Self {
        Self::Named(Cow::Borrowed(value))
    }
}

impl From<String> for BundleId {
    fn from(value: String) -> Self {
        Self::Named(Cow::Owned(value))
    }
}

impl From<&String> for BundleId {
    fn from(value: &String) -> Self {
        Self::Named(Cow::Owned(value.to_owned()))
    }
}

impl From<&BundleId> for BundleId {
    fn from(value: &BundleId) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for BundleId {
    fn eq(&self, other: &str) -> bool {
        self.as_name() == Some(other)
    }
}

impl PartialEq<&str> for BundleId {
    fn eq(&self, other: &&str) -> bool {
        self.as_name() == Some(*other)
    }
}

/// Conversion of "one id or a list of ids" arguments into a list of bundle ids.
pub trait IntoBundleIds {
    fn into_bundle_ids(self) -> Vec<BundleId>;
}

impl IntoBundleIds for BundleId {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        vec![self]
    }
}

impl IntoBundleIds for &BundleId {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        vec![self.clone()]
    }
}

impl IntoBundleIds for &'static str {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        vec![self.into()]
    }
}

impl IntoBundleIds for String {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        vec![self.into()]
    }
}

impl<T: Into<BundleId>> IntoBundleIds for Vec<T> {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<BundleId>, const N: usize> IntoBundleIds for [T; N] {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<BundleId> + Clone> IntoBundleIds for &[T] {
    fn into_bundle_ids(self) -> Vec<BundleId> {
        self.iter().cloned().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_id_conversions() {
        assert_eq!("core".into_bundle_ids(), vec![BundleId::named("core")]);
        assert_eq!(
            ["a", "b"].into_bundle_ids(),
            vec![BundleId::from("a"), BundleId::from("b")]
        );
        assert_eq!(
            vec![BundleId::Anonymous(3)].into_bundle_ids(),
            vec![BundleId::Anonymous(3)]
        );
        assert!(BundleId::from("").is_empty());
        assert!(!BundleId::Anonymous(0).is_empty());
        assert_ne!(BundleId::from("0"), BundleId::Anonymous(0));
        assert_eq!(BundleId::Anonymous(7).to_string(), "#7");
        assert_eq!(BundleId::from("x"), "x");
    }

    #[test]
    fn test_bundle_id_serde() {
        let ids: Vec<BundleId> = serde_json::from_str(r#"["vendor", 4]"#).unwrap();
        assert_eq!(ids, vec![BundleId::from("vendor"), BundleId::Anonymous(4)]);
        assert_eq!(
            serde_json::to_string(&BundleId::from("vendor")).unwrap(),
            r#""vendor""#
        );
    }
}
