use crate::{bundle::id::BundleId, loader::Loader};
use std::collections::HashSet;

/// A struct to track the loading status of bundles in the loader.
#[derive(Debug, Default, Clone)]
pub struct BundlesLoadingTracker {
    bundles: HashSet<BundleId>,
}

impl BundlesLoadingTracker {
    /// Creates a modified `BundlesLoadingTracker` instance.
    ///
    /// # Arguments
    /// - `id`: Bundle to track.
    ///
    /// # Returns
    /// A modified `BundlesLoadingTracker` instance with the specified bundle tracked.
    pub fn with(mut self, id: impl Into<BundleId>) -> Self {
        self.track(id);
        self
    }

    /// Creates a modified `BundlesLoadingTracker` instance with multiple bundles.
    ///
    /// # Arguments
    /// - `ids`: An iterable collection of bundles to track.
    pub fn with_many(mut self, ids: impl IntoIterator<Item = impl Into<BundleId>>) -> Self {
        self.track_many(ids);
        self
    }

    pub fn track(&mut self, id: impl Into<BundleId>) {
        self.bundles.insert(id.into());
    }

    pub fn track_many(&mut self, ids: impl IntoIterator<Item = impl Into<BundleId>>) {
        self.bundles.extend(ids.into_iter().map(Into::into));
    }

    pub fn untrack(&mut self, id: impl Into<BundleId>) {
        self.bundles.remove(&id.into());
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BundleId> + '_ {
        self.bundles.iter()
    }

    /// Reports the status of tracked bundles in the loader.
    ///
    /// # Arguments
    /// - `loader`: Loader that owns tracked bundles.
    /// - `out_status`: A mutable reference to output `BundlesLoadingStatus`.
    pub fn report(&self, loader: &Loader, out_status: &mut BundlesLoadingStatus) {
        out_status.clear();
        for id in &self.bundles {
            match loader.bundle_result(id) {
                Some(not_found) if not_found.is_empty() => out_status.succeeded.add(id),
                Some(_) => out_status.failed.add(id),
                None if loader.is_defined(id) => out_status.loading.add(id),
                None => out_status.undefined.add(id),
            }
        }
    }
}

/// A struct to represent the loading status of bundles category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundlesLoadingStatusCategory {
    Amount(usize),
    List(Vec<BundleId>),
}

impl Default for BundlesLoadingStatusCategory {
    fn default() -> Self {
        Self::amount()
    }
}

impl BundlesLoadingStatusCategory {
    pub fn amount() -> Self {
        Self::Amount(0)
    }

    pub fn list() -> Self {
        Self::List(Default::default())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Amount(len) => *len,
            Self::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            Self::Amount(len) => *len = 0,
            Self::List(list) => list.clear(),
        }
    }

    pub fn add(&mut self, id: &BundleId) {
        match self {
            Self::Amount(len) => *len += 1,
            Self::List(list) => list.push(id.clone()),
        }
    }
}

/// Tracked bundles split by their state. Bundles that were never defined nor
/// published are reported as undefined.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BundlesLoadingStatus {
    pub undefined: BundlesLoadingStatusCategory,
    pub loading: BundlesLoadingStatusCategory,
    pub succeeded: BundlesLoadingStatusCategory,
    pub failed: BundlesLoadingStatusCategory,
}

impl BundlesLoadingStatus {
    /// Creates a new `BundlesLoadingStatus` instance with all categories as amount variants.
    pub fn amount() -> Self {
        Self::default()
    }

    /// Creates a new `BundlesLoadingStatus` instance with all categories as list variants.
    pub fn list() -> Self {
        Self {
            undefined: BundlesLoadingStatusCategory::list(),
            loading: BundlesLoadingStatusCategory::list(),
            succeeded: BundlesLoadingStatusCategory::list(),
            failed: BundlesLoadingStatusCategory::list(),
        }
    }

    pub fn clear(&mut self) {
        self.undefined.clear();
        self.loading.clear();
        self.succeeded.clear();
        self.failed.clear();
    }

    pub fn progress(&self) -> BundlesLoadingProgress {
        BundlesLoadingProgress {
            undefined: self.undefined.len(),
            loading: self.loading.len(),
            succeeded: self.succeeded.len(),
            failed: self.failed.len(),
        }
    }
}

/// A struct to represent the loading progress of bundles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BundlesLoadingProgress {
    pub undefined: usize,
    pub loading: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BundlesLoadingProgress {
    pub fn total(&self) -> usize {
        self.undefined + self.loading + self.succeeded + self.failed
    }

    /// Tells if every tracked bundle got published, successfully or not.
    pub fn is_complete(&self) -> bool {
        self.undefined == 0 && self.loading == 0
    }

    pub fn is_in_progress(&self) -> bool {
        !self.is_complete()
    }

    /// Returns the factor of the loading progress (0-1).
    pub fn factor(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            (self.succeeded + self.failed) as f32 / total as f32
        }
    }
}

/// Resource fetch counters of the whole loader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResourcesLoadingProgress {
    pub awaiting: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl ResourcesLoadingProgress {
    pub fn total(&self) -> usize {
        self.awaiting + self.loaded + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.awaiting == 0
    }

    pub fn factor(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            (self.loaded + self.failed) as f32 / total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fetch::immediate::ImmediateFetch, request::LoadArg};

    #[test]
    fn test_report() {
        let loader = Loader::default().with_fetch(ImmediateFetch::new([("a.js", b"".as_slice())]));
        loader.load_with("a.js", [LoadArg::bundle("ok")]).unwrap();
        loader
            .load_with("missing.js", [LoadArg::bundle("broken")])
            .unwrap();
        let tracker = BundlesLoadingTracker::default().with_many(["ok", "broken", "later"]);

        let mut status = BundlesLoadingStatus::list();
        tracker.report(&loader, &mut status);
        assert_eq!(status.loading.len(), 2);
        assert_eq!(
            status.undefined,
            BundlesLoadingStatusCategory::List(vec!["later".into()])
        );
        assert!(status.progress().is_in_progress());

        loader.maintain().unwrap();
        let mut status = BundlesLoadingStatus::amount();
        tracker.report(&loader, &mut status);
        let progress = status.progress();
        assert_eq!(progress.succeeded, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.undefined, 1);
        assert!((progress.factor() - 2.0 / 3.0).abs() < f32::EPSILON);

        loader.done("later").unwrap();
        tracker.report(&loader, &mut status);
        assert!(status.progress().is_complete());
    }

    #[test]
    fn test_resources_progress_factor() {
        assert_eq!(ResourcesLoadingProgress::default().factor(), 1.0);
        let progress = ResourcesLoadingProgress {
            awaiting: 1,
            loaded: 2,
            failed: 1,
        };
        assert!(!progress.is_complete());
        assert_eq!(progress.factor(), 0.75);
    }
}
