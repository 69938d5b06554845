use crate::bundle::{id::BundleId, registry::BundleRegistry};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

type WaiterCallback = Box<dyn FnOnce(Vec<BundleId>)>;

struct WaiterState {
    remaining: usize,
    failed: Vec<BundleId>,
    callback: Option<WaiterCallback>,
}

/// Pending subscription awaiting results of a set of bundles.
pub struct Waiter {
    state: RefCell<WaiterState>,
}

impl Waiter {
    fn new(count: usize, callback: WaiterCallback) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(WaiterState {
                remaining: count,
                failed: Default::default(),
                callback: Some(callback),
            }),
        })
    }

    /// Folds one published bundle result into this waiter, firing its callback
    /// once all awaited bundles got folded. Failed bundles are reported once,
    /// even if they were awaited multiple times.
    pub fn fold(&self, id: &BundleId, failed: bool) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.callback.is_none() {
                return;
            }
            if failed && !state.failed.contains(id) {
                state.failed.push(id.clone());
            }
            state.remaining = state.remaining.saturating_sub(1);
            tracing::trace!(
                "Waiter folded bundle `{}` (failed: {}), remaining: {}",
                id,
                failed,
                state.remaining
            );
            if state.remaining > 0 {
                return;
            }
            state
                .callback
                .take()
                .map(|callback| (callback, std::mem::take(&mut state.failed)))
        };
        if let Some((callback, failed)) = callback {
            callback(failed);
        }
    }

    fn fire_empty(&self) {
        let callback = self.state.borrow_mut().callback.take();
        if let Some(callback) = callback {
            callback(vec![]);
        }
    }

    pub fn remaining(&self) -> usize {
        self.state.borrow().remaining
    }

    pub fn is_resolved(&self) -> bool {
        self.state.borrow().callback.is_none()
    }
}

/// Per-bundle callback queues of waiters that await bundle results.
#[derive(Default)]
pub struct Subscriptions {
    queues: HashMap<BundleId, Vec<Rc<Waiter>>>,
}

impl Subscriptions {
    /// Registers waiter for given bundles.
    ///
    /// Waiter is queued for every bundle that has no result yet. Bundles that
    /// already published are returned along with the waiter, so caller can fold
    /// them with [`PendingSubscription::fold_resolved`] once it no longer holds any
    /// borrows that user callbacks might need.
    ///
    /// # Arguments
    /// - `registry`: Registry with cached bundle results.
    /// - `ids`: Bundles to await. Duplicates are counted independently.
    /// - `callback`: Receives bundles that resolved with missing resources.
    pub fn subscribe(
        &mut self,
        registry: &BundleRegistry,
        ids: Vec<BundleId>,
        callback: impl FnOnce(Vec<BundleId>) + 'static,
    ) -> PendingSubscription {
        let waiter = Waiter::new(ids.len(), Box::new(callback));
        let mut resolved = vec![];
        for id in ids {
            if let Some(not_found) = registry.result_of(&id) {
                resolved.push((id, !not_found.is_empty()));
            } else {
                self.queues.entry(id).or_default().push(waiter.clone());
            }
        }
        PendingSubscription { waiter, resolved }
    }

    /// Takes out queue of waiters for published bundle. Queue is removed
    /// before any waiter gets notified, so waiters may subscribe again.
    pub fn take_queue(&mut self, id: &BundleId) -> Vec<Rc<Waiter>> {
        self.queues.remove(id).unwrap_or_default()
    }

    /// Notifies snapshot of waiters about bundle result.
    pub fn notify(queue: Vec<Rc<Waiter>>, id: &BundleId, failed: bool) {
        for waiter in queue {
            waiter.fold(id, failed);
        }
    }

    pub fn queue_len(&self, id: &BundleId) -> usize {
        self.queues.get(id).map(|queue| queue.len()).unwrap_or_default()
    }

    pub fn awaited(&self) -> impl Iterator<Item = &BundleId> + '_ {
        self.queues.keys()
    }

    pub fn clear(&mut self) {
        self.queues.clear();
    }
}

/// Waiter freshly registered by [`Subscriptions::subscribe`], with bundles
/// that were already resolved at subscription time.
pub struct PendingSubscription {
    waiter: Rc<Waiter>,
    resolved: Vec<(BundleId, bool)>,
}

impl PendingSubscription {
    /// Folds already resolved bundles into the waiter. Waiter with no
    /// dependencies at all resolves here with no failures.
    pub fn fold_resolved(self) -> Rc<Waiter> {
        if self.waiter.remaining() == 0 {
            self.waiter.fire_empty();
        }
        for (id, failed) in &self.resolved {
            self.waiter.fold(id, *failed);
        }
        self.waiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::registry::NotFoundList;

    type Outcome = Rc<RefCell<Vec<Vec<BundleId>>>>;

    fn recorder() -> (Outcome, impl FnOnce(Vec<BundleId>) + 'static) {
        let outcome = Outcome::default();
        let outcome2 = outcome.clone();
        (outcome, move |failed: Vec<BundleId>| outcome2.borrow_mut().push(failed))
    }

    fn publish(
        registry: &mut BundleRegistry,
        subscriptions: &mut Subscriptions,
        id: &str,
        not_found: NotFoundList,
    ) {
        let id = BundleId::named(id.to_owned());
        let failed = !not_found.is_empty();
        registry.publish(&id, not_found).unwrap();
        let queue = subscriptions.take_queue(&id);
        Subscriptions::notify(queue, &id, failed);
    }

    #[test]
    fn test_waits_for_all() {
        let mut registry = BundleRegistry::default();
        let mut subscriptions = Subscriptions::default();
        let (outcome, callback) = recorder();
        subscriptions
            .subscribe(&registry, vec!["a".into(), "b".into()], callback)
            .fold_resolved();
        assert_eq!(subscriptions.queue_len(&"a".into()), 1);

        publish(&mut registry, &mut subscriptions, "b", vec![]);
        assert!(outcome.borrow().is_empty());
        publish(&mut registry, &mut subscriptions, "a", vec!["a.js".into()]);
        assert_eq!(*outcome.borrow(), vec![vec![BundleId::from("a")]]);
        assert_eq!(subscriptions.queue_len(&"a".into()), 0);
        assert_eq!(subscriptions.awaited().count(), 0);
    }

    #[test]
    fn test_mixed_resolved_and_pending() {
        let mut registry = BundleRegistry::default();
        let mut subscriptions = Subscriptions::default();
        publish(&mut registry, &mut subscriptions, "a", vec!["a.js".into()]);

        let (outcome, callback) = recorder();
        let waiter = subscriptions
            .subscribe(&registry, vec!["a".into(), "b".into()], callback)
            .fold_resolved();
        assert_eq!(waiter.remaining(), 1);
        assert!(outcome.borrow().is_empty());

        publish(&mut registry, &mut subscriptions, "b", vec![]);
        assert!(waiter.is_resolved());
        assert_eq!(*outcome.borrow(), vec![vec![BundleId::from("a")]]);
    }

    #[test]
    fn test_all_resolved_fires_immediately() {
        let mut registry = BundleRegistry::default();
        let mut subscriptions = Subscriptions::default();
        publish(&mut registry, &mut subscriptions, "a", vec![]);

        let (outcome, callback) = recorder();
        subscriptions
            .subscribe(&registry, vec!["a".into()], callback)
            .fold_resolved();
        assert_eq!(*outcome.borrow(), vec![Vec::<BundleId>::new()]);
    }

    #[test]
    fn test_empty_dependencies() {
        let registry = BundleRegistry::default();
        let mut subscriptions = Subscriptions::default();
        let (outcome, callback) = recorder();
        subscriptions
            .subscribe(&registry, vec![], callback)
            .fold_resolved();
        assert_eq!(outcome.borrow().len(), 1);
    }

    #[test]
    fn test_duplicate_dependencies() {
        let mut registry = BundleRegistry::default();
        let mut subscriptions = Subscriptions::default();
        let (outcome, callback) = recorder();
        subscriptions
            .subscribe(&registry, vec!["a".into(), "a".into()], callback)
            .fold_resolved();
        assert_eq!(subscriptions.queue_len(&"a".into()), 2);
        publish(&mut registry, &mut subscriptions, "a", vec!["x".into()]);
        assert_eq!(*outcome.borrow(), vec![vec![BundleId::from("a")]]);
    }
}
