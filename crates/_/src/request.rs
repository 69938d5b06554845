//! Typed load and ready requests, and the parser of the positional calling
//! form that turns loosely ordered arguments into a [`LoadRequest`].

use crate::{
    bundle::{
        id::BundleId,
        path::{IntoResourcePaths, ResourcePath},
    },
    error::LoaderError,
    fetch::ResourceAttributes,
};

pub type SuccessCallback = Box<dyn FnOnce()>;
pub type LoadErrorCallback = Box<dyn FnOnce(&[ResourcePath])>;
pub type ReadyErrorCallback = Box<dyn FnOnce(&[BundleId])>;
/// Callback of positional calling form. Success callbacks get empty list.
pub type PositionalCallback = Box<dyn FnOnce(&[ResourcePath])>;

/// Object-style load options.
#[derive(Default)]
pub struct LoadOptions {
    pub success: Option<SuccessCallback>,
    pub error: Option<LoadErrorCallback>,
    /// `Some(false)` fetches resources one after another, in given order.
    /// `None` uses loader default.
    pub asynchronous: Option<bool>,
    pub attributes: ResourceAttributes,
}

impl LoadOptions {
    pub fn success(mut self, f: impl FnOnce() + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnOnce(&[ResourcePath]) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn asynchronous(mut self, value: bool) -> Self {
        self.asynchronous = Some(value);
        self
    }

    /// Adds passthrough attribute. Keys outside of allow-list are dropped.
    pub fn attribute(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.attributes.set(key, value);
        self
    }
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("asynchronous", &self.asynchronous)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Fully resolved load request.
#[derive(Debug)]
pub struct LoadRequest {
    pub paths: Vec<ResourcePath>,
    pub bundle: Option<BundleId>,
    pub options: LoadOptions,
}

impl LoadRequest {
    pub fn new(paths: impl IntoResourcePaths) -> Self {
        Self {
            paths: paths.into_resource_paths(),
            bundle: None,
            options: Default::default(),
        }
    }

    pub fn bundle(mut self, id: impl Into<BundleId>) -> Self {
        self.bundle = Some(id.into());
        self
    }

    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn on_success(mut self, f: impl FnOnce() + 'static) -> Self {
        self.options.success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&[ResourcePath]) + 'static) -> Self {
        self.options.error = Some(Box::new(f));
        self
    }

    pub fn asynchronous(mut self, value: bool) -> Self {
        self.options.asynchronous = Some(value);
        self
    }

    pub fn attribute(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.options.attributes.set(key, value);
        self
    }

    /// Resolves positional calling form: `paths, [bundle], [success], [error]`
    /// or `paths, [bundle], [options]`.
    ///
    /// Bundle id is only accepted as the first argument. The first callback is
    /// the success callback, the second one is the error callback. Options
    /// object can not be mixed with positional callbacks.
    pub fn parse(
        paths: impl IntoResourcePaths,
        args: impl IntoIterator<Item = LoadArg>,
    ) -> Result<Self, LoaderError> {
        let mut result = Self::new(paths);
        let mut callbacks = 0;
        let mut has_options = false;
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                LoadArg::Bundle(id) => {
                    if index != 0 {
                        return Err(LoaderError::InvalidArgument(format!(
                            "bundle id `{}` must be the first argument, found at position {}",
                            id, index
                        )));
                    }
                    result.bundle = Some(id);
                }
                LoadArg::Callback(callback) => {
                    if has_options {
                        return Err(LoaderError::InvalidArgument(
                            "callbacks can not follow options object".to_owned(),
                        ));
                    }
                    match callbacks {
                        0 => result.options.success = Some(Box::new(move || callback(&[]))),
                        1 => result.options.error = Some(callback),
                        _ => {
                            return Err(LoaderError::InvalidArgument(
                                "too many callbacks, expected success and error".to_owned(),
                            ));
                        }
                    }
                    callbacks += 1;
                }
                LoadArg::Options(options) => {
                    if has_options || callbacks > 0 {
                        return Err(LoaderError::InvalidArgument(
                            "options object can not be combined with other callbacks".to_owned(),
                        ));
                    }
                    has_options = true;
                    result.options = options;
                }
            }
        }
        Ok(result)
    }
}

/// Single argument of positional calling form.
pub enum LoadArg {
    Bundle(BundleId),
    Callback(PositionalCallback),
    Options(LoadOptions),
}

impl LoadArg {
    pub fn bundle(id: impl Into<BundleId>) -> Self {
        Self::Bundle(id.into())
    }

    pub fn callback(f: impl FnOnce(&[ResourcePath]) + 'static) -> Self {
        Self::Callback(Box::new(f))
    }
}

impl From<BundleId> for LoadArg {
    fn from(value: BundleId) -> Self {
        Self::Bundle(value)
    }
}

impl From<&'static str> for LoadArg {
    fn from(value: &'static str) -> Self {
        Self::Bundle(value.into())
    }
}

impl From<LoadOptions> for LoadArg {
    fn from(value: LoadOptions) -> Self {
        Self::Options(value)
    }
}

/// Callbacks of `ready` subscription.
#[derive(Default)]
pub struct ReadyOptions {
    pub success: Option<SuccessCallback>,
    pub error: Option<ReadyErrorCallback>,
}

impl ReadyOptions {
    pub fn success(mut self, f: impl FnOnce() + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnOnce(&[BundleId]) + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_parse_bundle_and_callbacks() {
        let calls = Rc::new(RefCell::new(vec![]));
        let (calls1, calls2) = (calls.clone(), calls.clone());
        let request = LoadRequest::parse(
            ["a.js", "b.js"],
            [
                LoadArg::bundle("core"),
                LoadArg::callback(move |_| calls1.borrow_mut().push("success".to_owned())),
                LoadArg::callback(move |missing| {
                    calls2.borrow_mut().push(format!("error {}", missing.len()))
                }),
            ],
        )
        .unwrap();
        assert_eq!(request.paths.len(), 2);
        assert_eq!(request.bundle, Some(BundleId::from("core")));
        (request.options.success.unwrap())();
        (request.options.error.unwrap())(&[ResourcePath::new("b.js")]);
        assert_eq!(*calls.borrow(), vec!["success", "error 1"]);
    }

    #[test]
    fn test_parse_callbacks_without_bundle() {
        let request = LoadRequest::parse("a.js", [LoadArg::callback(|_| {})]).unwrap();
        assert!(request.bundle.is_none());
        assert!(request.options.success.is_some());
        assert!(request.options.error.is_none());
    }

    #[test]
    fn test_parse_options() {
        let request = LoadRequest::parse(
            "a.css",
            [
                LoadArg::from("theme"),
                LoadArg::from(
                    LoadOptions::default()
                        .asynchronous(false)
                        .attribute("media", "print")
                        .attribute("onload", "x()"),
                ),
            ],
        )
        .unwrap();
        assert_eq!(request.bundle, Some(BundleId::from("theme")));
        assert_eq!(request.options.asynchronous, Some(false));
        assert_eq!(request.options.attributes.len(), 1);
    }

    #[test]
    fn test_parse_rejects_ambiguity() {
        assert!(matches!(
            LoadRequest::parse("a.js", [LoadArg::callback(|_| {}), LoadArg::bundle("x")]),
            Err(LoaderError::InvalidArgument(_))
        ));
        assert!(matches!(
            LoadRequest::parse(
                "a.js",
                [
                    LoadArg::callback(|_| {}),
                    LoadArg::callback(|_| {}),
                    LoadArg::callback(|_| {})
                ]
            ),
            Err(LoaderError::InvalidArgument(_))
        ));
        assert!(matches!(
            LoadRequest::parse(
                "a.js",
                [LoadArg::from(LoadOptions::default()), LoadArg::callback(|_| {})]
            ),
            Err(LoaderError::InvalidArgument(_))
        ));
    }
}
