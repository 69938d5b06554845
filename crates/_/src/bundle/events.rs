use crate::bundle::{id::BundleId, path::ResourcePath};
use std::{error::Error, sync::mpsc::Sender};

/// Kinds of events emitted by the loader while bundles progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderEventKind {
    BundleDefined,
    ResourceRequested,
    ResourceLoaded,
    ResourceFailed,
    BundlePublished,
}

impl LoaderEventKind {
    pub fn is_resource(self) -> bool {
        matches!(
            self,
            Self::ResourceRequested | Self::ResourceLoaded | Self::ResourceFailed
        )
    }

    pub fn is_bundle(self) -> bool {
        !self.is_resource()
    }

    pub fn failure(self) -> bool {
        matches!(self, Self::ResourceFailed)
    }
}

/// Single loader event. Resource events carry the resource path, every event
/// carries the bundle it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoaderEvent {
    pub kind: LoaderEventKind,
    pub bundle: BundleId,
    pub path: Option<ResourcePath>,
}

/// A trait for listeners that observe loader events.
///
/// Listeners are called while the loader dispatches, so they must not bind or
/// unbind other listeners from within `on_dispatch`.
pub trait LoaderEventListener {
    fn on_dispatch(&mut self, event: LoaderEvent) -> Result<(), Box<dyn Error>>;
}

impl LoaderEventListener for Sender<LoaderEvent> {
    fn on_dispatch(&mut self, event: LoaderEvent) -> Result<(), Box<dyn Error>> {
        self.send(event)?;
        Ok(())
    }
}

impl<F> LoaderEventListener for F
where
    F: FnMut(LoaderEvent) -> Result<(), Box<dyn Error>>,
{
    fn on_dispatch(&mut self, event: LoaderEvent) -> Result<(), Box<dyn Error>> {
        self(event)
    }
}

/// A unique identifier for a loader event listener binding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoaderEventBinding(usize);

struct BoundListener {
    binding: LoaderEventBinding,
    listener: Box<dyn LoaderEventListener>,
    once: bool,
}

/// Listeners bound to loader events.
#[derive(Default)]
pub struct LoaderEventBindings {
    id_generator: usize,
    bindings: Vec<BoundListener>,
}

impl LoaderEventBindings {
    /// Adds a new listener and returns its binding identifier.
    pub fn bind(&mut self, listener: impl LoaderEventListener + 'static) -> LoaderEventBinding {
        self.push(listener, false)
    }

    /// Adds a listener that gets removed right after its first dispatch.
    pub fn bind_once(
        &mut self,
        listener: impl LoaderEventListener + 'static,
    ) -> LoaderEventBinding {
        self.push(listener, true)
    }

    /// Removes a listener by its binding identifier.
    ///
    /// # Returns
    /// The removed listener, if found.
    pub fn unbind(&mut self, binding: LoaderEventBinding) -> Option<Box<dyn LoaderEventListener>> {
        self.bindings
            .iter()
            .position(|bound| bound.binding == binding)
            .map(|index| self.bindings.remove(index).listener)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Dispatches event to all listeners, in binding order.
    ///
    /// Every listener receives the event even if some of them fail - the first
    /// error is returned after dispatch completes.
    pub fn dispatch(&mut self, event: LoaderEvent) -> Result<(), Box<dyn Error>> {
        let mut result = Ok(());
        for bound in &mut self.bindings {
            if let Err(error) = bound.listener.on_dispatch(event.clone()) {
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        self.bindings.retain(|bound| !bound.once);
        result
    }

    fn push(&mut self, listener: impl LoaderEventListener + 'static, once: bool) -> LoaderEventBinding {
        let binding = LoaderEventBinding(self.id_generator);
        self.id_generator = self.id_generator.wrapping_add(1);
        self.bindings.push(BoundListener {
            binding,
            listener: Box::new(listener),
            once,
        });
        binding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc, sync::mpsc::channel};

    fn event(kind: LoaderEventKind) -> LoaderEvent {
        LoaderEvent {
            kind,
            bundle: "core".into(),
            path: Some("core.js".into()),
        }
    }

    #[test]
    fn test_bind_once_and_unbind() {
        let seen = Rc::new(RefCell::new(vec![]));
        let seen2 = seen.clone();
        let mut bindings = LoaderEventBindings::default();
        let (tx, rx) = channel::<LoaderEvent>();
        let channel_binding = bindings.bind(tx);
        bindings.bind_once(move |event: LoaderEvent| -> Result<(), Box<dyn Error>> {
            seen2.borrow_mut().push(event.kind);
            Ok(())
        });
        assert_eq!(bindings.len(), 2);

        bindings.dispatch(event(LoaderEventKind::ResourceLoaded)).unwrap();
        bindings.dispatch(event(LoaderEventKind::BundlePublished)).unwrap();
        assert_eq!(*seen.borrow(), vec![LoaderEventKind::ResourceLoaded]);
        assert_eq!(bindings.len(), 1);

        assert!(bindings.unbind(channel_binding).is_some());
        assert!(bindings.is_empty());
        let received = rx.try_iter().map(|event| event.kind).collect::<Vec<_>>();
        assert_eq!(
            received,
            vec![LoaderEventKind::ResourceLoaded, LoaderEventKind::BundlePublished]
        );
    }

    #[test]
    fn test_failing_listener_does_not_starve_others() {
        let mut bindings = LoaderEventBindings::default();
        let (tx, rx) = channel::<LoaderEvent>();
        bindings.bind(|_: LoaderEvent| -> Result<(), Box<dyn Error>> { Err("nope".into()) });
        bindings.bind(tx);
        assert!(bindings.dispatch(event(LoaderEventKind::ResourceFailed)).is_err());
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_event_kind_categories() {
        assert!(LoaderEventKind::ResourceFailed.failure());
        assert!(LoaderEventKind::ResourceRequested.is_resource());
        assert!(LoaderEventKind::BundleDefined.is_bundle());
    }
}
