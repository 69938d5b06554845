use crate::{
    bundle::{
        events::{LoaderEvent, LoaderEventBindings, LoaderEventKind},
        fan_in::{FanIn, await_all},
        id::{BundleId, IntoBundleIds},
        loading::ResourcesLoadingProgress,
        path::{IntoResourcePaths, ResourcePath},
        registry::{BundleRegistry, NotFoundList},
        subscription::Subscriptions,
    },
    config::LoaderConfig,
    error::LoaderError,
    fetch::{
        FetchEngine, FetchError, FetchReport, FetchRequest, FetchTicket, Resource,
        ResourceAttributes,
    },
    request::{LoadArg, LoadOptions, LoadRequest, ReadyOptions},
};
use futures::{FutureExt, channel::oneshot};
use std::{
    cell::{Cell, RefCell, RefMut},
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

type QueuedFetches = VecDeque<(FetchRequest, FanIn<FetchRequest>)>;

struct InFlight {
    bundle: BundleId,
    request: FetchRequest,
    fan_in: FanIn<FetchRequest>,
    /// Requests of ordered load that start after this one reports.
    queued: QueuedFetches,
}

struct LoaderInner {
    config: LoaderConfig,
    registry: RefCell<BundleRegistry>,
    subscriptions: RefCell<Subscriptions>,
    engine: RefCell<Option<Box<dyn FetchEngine>>>,
    /// Engine is taken out of its slot while it runs user code.
    engine_busy: Cell<bool>,
    /// Fetches started while engine was busy, handed to it on next maintenance.
    parked: RefCell<VecDeque<(FetchTicket, FetchRequest)>>,
    in_flight: RefCell<HashMap<FetchTicket, InFlight>>,
    resources: RefCell<HashMap<ResourcePath, Rc<Resource>>>,
    events: RefCell<LoaderEventBindings>,
    next_ticket: Cell<u64>,
    next_anonymous_id: Cell<u64>,
    loaded: Cell<usize>,
    failed: Cell<usize>,
}

/// Coordinates loading of resource bundles and notifies subscribers once the
/// bundles they wait for complete.
///
/// `Loader` is a cheap handle - clones share the same state, so callbacks can
/// capture a clone and call back into the loader. All work happens on the
/// thread that owns the loader: fetch engines may load in the background, but
/// their results are only processed by [`Loader::maintain`].
#[derive(Clone)]
pub struct Loader {
    inner: Rc<LoaderInner>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        let next_anonymous_id = config.first_anonymous_id;
        Self {
            inner: Rc::new(LoaderInner {
                config,
                registry: Default::default(),
                subscriptions: Default::default(),
                engine: Default::default(),
                engine_busy: Cell::new(false),
                parked: Default::default(),
                in_flight: Default::default(),
                resources: Default::default(),
                events: Default::default(),
                next_ticket: Cell::new(0),
                next_anonymous_id: Cell::new(next_anonymous_id),
                loaded: Cell::new(0),
                failed: Cell::new(0),
            }),
        }
    }

    pub fn with_fetch(self, engine: impl FetchEngine) -> Self {
        self.set_fetch(engine);
        self
    }

    /// Installs fetch engine, returning previous one.
    ///
    /// Fetches already started by previous engine will never report back, so
    /// engine should only be replaced while loader is not busy.
    pub fn set_fetch(&self, engine: impl FetchEngine) -> Option<Box<dyn FetchEngine>> {
        if self.is_busy() {
            tracing::warn!("Replacing fetch engine of busy loader");
        }
        self.inner.engine.borrow_mut().replace(Box::new(engine))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Starts loading resources of a bundle.
    ///
    /// Bundle gets defined right away - if request has no bundle id, fresh
    /// anonymous id is allocated. Once all resources report, either success
    /// or error callback is called (the latter with resources that failed),
    /// then bundle result gets published to its subscribers.
    ///
    /// # Returns
    /// Id of the defined bundle, or `LoaderError::DuplicateBundle` if named
    /// bundle was already defined - in that case nothing gets loaded.
    pub fn load(&self, request: LoadRequest) -> Result<BundleId, LoaderError> {
        if self.inner.engine.borrow().is_none() && !self.inner.engine_busy.get() {
            return Err(LoaderError::MissingFetchEngine);
        }
        let LoadRequest {
            paths,
            bundle,
            options,
        } = request;
        let LoadOptions {
            success,
            error,
            asynchronous,
            attributes,
        } = options;
        let id = match bundle {
            Some(id) if !id.is_empty() => id,
            _ => self.allocate_anonymous_id(),
        };
        self.inner.registry.borrow_mut().define(id.clone())?;
        let asynchronous = asynchronous.unwrap_or(self.inner.config.asynchronous);
        tracing::debug!(
            "Defined bundle `{}` with {} resource(s) (asynchronous: {})",
            id,
            paths.len(),
            asynchronous
        );
        self.dispatch(LoaderEventKind::BundleDefined, &id, None);

        let requests = paths
            .into_iter()
            .map(|path| self.make_request(path, asynchronous, &attributes))
            .collect::<Vec<_>>();
        let loader = Rc::downgrade(&self.inner);
        let bundle = id.clone();
        let mut pending = VecDeque::with_capacity(requests.len());
        await_all(
            requests,
            |request, fan_in| pending.push_back((request, fan_in)),
            move |failed| {
                let not_found = failed
                    .into_iter()
                    .map(|request| request.path)
                    .collect::<NotFoundList>();
                if not_found.is_empty() {
                    if let Some(success) = success {
                        success();
                    }
                } else if let Some(error) = error {
                    error(&not_found);
                }
                if let Some(inner) = loader.upgrade() {
                    if let Err(error) = (Loader { inner }).publish(bundle, not_found) {
                        tracing::warn!("Skipping publish of loaded bundle: {}", error);
                    }
                }
            },
        );

        if asynchronous {
            for (request, fan_in) in pending {
                let _ = self.start_fetch(&id, request, fan_in, Default::default());
            }
        } else {
            self.start_queued(&id, pending);
        }
        Ok(id)
    }

    /// Positional calling form of [`Loader::load`].
    ///
    /// ```
    /// use lazybundle::{Loader, fetch::immediate::ImmediateFetch, request::LoadArg};
    ///
    /// let loader = Loader::default().with_fetch(ImmediateFetch::new([("app.js", b"".as_slice())]));
    /// loader
    ///     .load_with(
    ///         "app.js",
    ///         [LoadArg::bundle("app"), LoadArg::callback(|_| println!("app is loaded"))],
    ///     )
    ///     .unwrap();
    /// loader.maintain().unwrap();
    /// assert!(loader.is_published("app"));
    /// ```
    pub fn load_with(
        &self,
        paths: impl IntoResourcePaths,
        args: impl IntoIterator<Item = LoadArg>,
    ) -> Result<BundleId, LoaderError> {
        self.load(LoadRequest::parse(paths, args)?)
    }

    /// Calls success callback once all given bundles loaded, or error callback
    /// with bundles that had missing resources. Bundles do not have to be
    /// defined yet - bundles that already completed resolve immediately.
    /// Bundle awaited more than once is still reported as failed only once.
    pub fn ready(&self, ids: impl IntoBundleIds, options: ReadyOptions) -> &Self {
        let ReadyOptions { success, error } = options;
        self.subscribe(ids.into_bundle_ids(), move |failed| {
            if failed.is_empty() {
                if let Some(success) = success {
                    success();
                }
            } else if let Some(error) = error {
                error(&failed);
            }
        });
        self
    }

    /// Future variant of [`Loader::ready`]. Resolves once loader gets
    /// maintained enough for all given bundles to complete.
    pub fn ready_future(&self, ids: impl IntoBundleIds) -> ReadyFuture {
        let (sender, receiver) = oneshot::channel();
        self.subscribe(ids.into_bundle_ids(), move |failed| {
            let _ = sender.send(failed);
        });
        ReadyFuture { receiver }
    }

    /// Manually marks bundle as completed with no missing resources, without
    /// loading anything.
    pub fn done(&self, id: impl Into<BundleId>) -> Result<(), LoaderError> {
        self.publish(id.into(), Default::default())
    }

    /// Collects completed fetches from fetch engine and progresses bundles.
    ///
    /// Maintenance requested from within running fetch engine is skipped.
    pub fn maintain(&self) -> Result<(), LoaderError> {
        if self.inner.engine_busy.get() {
            tracing::debug!("Skipping maintenance requested from within fetch engine");
            return Ok(());
        }
        if self.inner.engine.borrow().is_none() {
            return Err(LoaderError::MissingFetchEngine);
        }
        self.start_parked();
        let mut reports = vec![];
        self.with_engine(|engine| engine.maintain(&mut reports))
            .ok_or(LoaderError::MissingFetchEngine)?
            .map_err(|error| LoaderError::Fetch(error.to_string()))?;
        for report in reports {
            self.process_report(report);
        }
        Ok(())
    }

    /// Tells if any fetch is still awaiting completion.
    pub fn is_busy(&self) -> bool {
        !self.inner.in_flight.borrow().is_empty()
    }

    pub fn is_defined(&self, id: impl Into<BundleId>) -> bool {
        self.inner.registry.borrow().is_defined(&id.into())
    }

    pub fn is_published(&self, id: impl Into<BundleId>) -> bool {
        self.inner.registry.borrow().is_published(&id.into())
    }

    /// Returns resources that failed to load in published bundle.
    pub fn bundle_result(&self, id: impl Into<BundleId>) -> Option<NotFoundList> {
        self.inner.registry.borrow().result_of(&id.into()).cloned()
    }

    /// Last successfully loaded resource under given path.
    pub fn resource(&self, path: impl Into<ResourcePath>) -> Option<Rc<Resource>> {
        self.inner.resources.borrow().get(&path.into()).cloned()
    }

    /// Resource counters. Requests waiting behind ordered fetches count as awaiting.
    pub fn progress(&self) -> ResourcesLoadingProgress {
        let awaiting = self
            .inner
            .in_flight
            .borrow()
            .values()
            .map(|in_flight| 1 + in_flight.queued.len())
            .sum();
        ResourcesLoadingProgress {
            awaiting,
            loaded: self.inner.loaded.get(),
            failed: self.inner.failed.get(),
        }
    }

    /// Access to event bindings. Listeners must not access bindings while dispatched.
    pub fn events(&self) -> RefMut<'_, LoaderEventBindings> {
        self.inner.events.borrow_mut()
    }

    /// Forgets all defined bundles, their results and pending subscriptions.
    /// Fetches in flight still complete and publish their bundles.
    pub fn reset(&self) {
        tracing::debug!("Resetting loader bundles");
        self.inner.registry.borrow_mut().clear();
        self.inner.subscriptions.borrow_mut().clear();
    }

    fn allocate_anonymous_id(&self) -> BundleId {
        let index = self.inner.next_anonymous_id.get();
        self.inner.next_anonymous_id.set(index.wrapping_add(1));
        BundleId::Anonymous(index)
    }

    fn make_request(
        &self,
        path: ResourcePath,
        asynchronous: bool,
        attributes: &ResourceAttributes,
    ) -> FetchRequest {
        let mut merged = self.inner.config.attributes.clone();
        merged.merge(&path.meta_items().collect::<ResourceAttributes>());
        merged.merge(attributes);
        FetchRequest::new(path)
            .asynchronous(asynchronous)
            .attributes(merged)
    }

    /// Runs engine taken out of its slot, so engine code may call back into loader.
    ///
    /// # Returns
    /// `None` if there is no engine, or it is already running.
    fn with_engine<R>(&self, f: impl FnOnce(&mut dyn FetchEngine) -> R) -> Option<R> {
        let mut engine = self.inner.engine.borrow_mut().take()?;
        self.inner.engine_busy.set(true);
        let result = f(&mut *engine);
        self.inner.engine_busy.set(false);
        let mut slot = self.inner.engine.borrow_mut();
        if slot.is_none() {
            *slot = Some(engine);
        } else {
            tracing::warn!("Fetch engine got replaced while running, dropping previous one");
        }
        Some(result)
    }

    fn engine_start(&self, ticket: FetchTicket, request: FetchRequest) -> Result<(), FetchError> {
        if self.inner.engine_busy.get() {
            tracing::debug!("Parking fetch of `{}` until fetch engine is free", request.path);
            self.inner.parked.borrow_mut().push_back((ticket, request));
            return Ok(());
        }
        self.with_engine(|engine| engine.start(ticket, request))
            .unwrap_or_else(|| Err("there is no fetch engine installed".into()))
    }

    fn start_parked(&self) {
        loop {
            let parked = self.inner.parked.borrow_mut().pop_front();
            let Some((ticket, request)) = parked else {
                break;
            };
            let path = request.path.clone();
            if let Err(error) = self.engine_start(ticket, request) {
                if let Some((bundle, queued)) = self.refused(ticket, &path, error) {
                    self.start_queued(&bundle, queued);
                }
            }
        }
    }

    /// Starts requests of ordered load, one at a time, until engine accepts one.
    fn start_queued(&self, bundle: &BundleId, mut queued: QueuedFetches) {
        while let Some((request, fan_in)) = queued.pop_front() {
            match self.start_fetch(bundle, request, fan_in, queued) {
                Ok(()) => return,
                Err(rest) => queued = rest,
            }
        }
    }

    /// # Returns
    /// Requests queued behind this one if engine refused to start it.
    fn start_fetch(
        &self,
        bundle: &BundleId,
        request: FetchRequest,
        fan_in: FanIn<FetchRequest>,
        queued: QueuedFetches,
    ) -> Result<(), QueuedFetches> {
        let ticket = FetchTicket::new(self.inner.next_ticket.get());
        self.inner.next_ticket.set(ticket.index().wrapping_add(1));
        tracing::debug!("Fetching `{}` of bundle `{}`", request.path, bundle);
        self.dispatch(
            LoaderEventKind::ResourceRequested,
            bundle,
            Some(&request.path),
        );
        self.inner.in_flight.borrow_mut().insert(
            ticket,
            InFlight {
                bundle: bundle.clone(),
                request: request.clone(),
                fan_in,
                queued,
            },
        );
        let path = request.path.clone();
        match self.engine_start(ticket, request) {
            Ok(()) => Ok(()),
            Err(error) => Err(self
                .refused(ticket, &path, error)
                .map(|(_, queued)| queued)
                .unwrap_or_default()),
        }
    }

    fn refused(
        &self,
        ticket: FetchTicket,
        path: &ResourcePath,
        error: FetchError,
    ) -> Option<(BundleId, QueuedFetches)> {
        tracing::warn!("Failed to start fetching `{}`: {}", path, error);
        let in_flight = self.inner.in_flight.borrow_mut().remove(&ticket)?;
        Some(self.finish(in_flight, false))
    }

    fn process_report(&self, report: FetchReport) {
        let in_flight = self.inner.in_flight.borrow_mut().remove(&report.ticket);
        let Some(in_flight) = in_flight else {
            tracing::warn!(
                "Ignoring report of `{}` with unknown ticket {:?}",
                report.path,
                report.ticket
            );
            return;
        };
        match report.result {
            Ok(resource) => {
                tracing::debug!(
                    "Loaded `{}` of bundle `{}` ({} bytes)",
                    resource.path,
                    in_flight.bundle,
                    resource.bytes.len()
                );
                self.inner.loaded.set(self.inner.loaded.get() + 1);
                self.inner
                    .resources
                    .borrow_mut()
                    .insert(resource.path.clone(), Rc::new(resource));
                self.complete(in_flight, true);
            }
            Err(error) => {
                tracing::warn!(
                    "Failed to load `{}` of bundle `{}`: {}",
                    report.path,
                    in_flight.bundle,
                    error
                );
                self.complete(in_flight, false);
            }
        }
    }

    fn complete(&self, in_flight: InFlight, loaded: bool) {
        let (bundle, queued) = self.finish(in_flight, loaded);
        self.start_queued(&bundle, queued);
    }

    fn finish(&self, in_flight: InFlight, loaded: bool) -> (BundleId, QueuedFetches) {
        let InFlight {
            bundle,
            request,
            fan_in,
            queued,
        } = in_flight;
        if !loaded {
            self.inner.failed.set(self.inner.failed.get() + 1);
        }
        let kind = if loaded {
            LoaderEventKind::ResourceLoaded
        } else {
            LoaderEventKind::ResourceFailed
        };
        self.dispatch(kind, &bundle, Some(&request.path));
        fan_in.report(request, loaded);
        (bundle, queued)
    }

    fn subscribe(&self, ids: Vec<BundleId>, callback: impl FnOnce(Vec<BundleId>) + 'static) {
        let pending = {
            let registry = self.inner.registry.borrow();
            self.inner
                .subscriptions
                .borrow_mut()
                .subscribe(&registry, ids, callback)
        };
        pending.fold_resolved();
    }

    fn publish(&self, id: BundleId, not_found: NotFoundList) -> Result<(), LoaderError> {
        let failed = !not_found.is_empty();
        let missing = not_found.len();
        if !self.inner.registry.borrow_mut().publish(&id, not_found)? {
            return Ok(());
        }
        tracing::debug!("Published bundle `{}` ({} missing)", id, missing);
        let queue = self.inner.subscriptions.borrow_mut().take_queue(&id);
        self.dispatch(LoaderEventKind::BundlePublished, &id, None);
        Subscriptions::notify(queue, &id, failed);
        Ok(())
    }

    fn dispatch(&self, kind: LoaderEventKind, bundle: &BundleId, path: Option<&ResourcePath>) {
        let Ok(mut events) = self.inner.events.try_borrow_mut() else {
            tracing::error!("Skipping {:?} event dispatched from within listener", kind);
            return;
        };
        if events.is_empty() {
            return;
        }
        let event = LoaderEvent {
            kind,
            bundle: bundle.clone(),
            path: path.cloned(),
        };
        if let Err(error) = events.dispatch(event) {
            tracing::error!("Loader event listener failed: {}", error);
        }
    }
}

/// Future resolving once all awaited bundles complete.
///
/// Resolves to `LoaderError::MissingDependencies` with bundles that had missing
/// resources, or `LoaderError::Canceled` when loader forgot the subscription.
pub struct ReadyFuture {
    receiver: oneshot::Receiver<Vec<BundleId>>,
}

impl Future for ReadyFuture {
    type Output = Result<(), LoaderError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut().receiver.poll_unpin(cx) {
            Poll::Ready(Ok(failed)) if failed.is_empty() => Poll::Ready(Ok(())),
            Poll::Ready(Ok(failed)) => Poll::Ready(Err(LoaderError::MissingDependencies(failed))),
            Poll::Ready(Err(_)) => Poll::Ready(Err(LoaderError::Canceled)),
            Poll::Pending => Poll::Pending,
        }
    }
}
