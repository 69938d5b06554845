use crate::{
    bundle::{id::BundleId, path::ResourcePath},
    error::LoaderError,
};
use std::collections::{HashMap, HashSet};

/// Ordered list of resources that failed to load.
pub type NotFoundList = Vec<ResourcePath>;

/// Registry of defined bundles and cached results of published ones.
#[derive(Debug, Default, Clone)]
pub struct BundleRegistry {
    defined: HashSet<BundleId>,
    results: HashMap<BundleId, NotFoundList>,
}

impl BundleRegistry {
    /// Marks bundle as defined.
    ///
    /// # Returns
    /// `LoaderError::DuplicateBundle` if bundle was already defined.
    pub fn define(&mut self, id: BundleId) -> Result<(), LoaderError> {
        if self.defined.contains(&id) {
            return Err(LoaderError::DuplicateBundle(id));
        }
        self.defined.insert(id);
        Ok(())
    }

    /// Caches final result of a bundle. Empty ids are silently skipped.
    ///
    /// # Returns
    /// - `Ok(true)` when result got stored.
    /// - `Ok(false)` for empty ids.
    /// - `LoaderError::AlreadyPublished` if bundle already has result.
    pub fn publish(&mut self, id: &BundleId, not_found: NotFoundList) -> Result<bool, LoaderError> {
        if id.is_empty() {
            return Ok(false);
        }
        if self.results.contains_key(id) {
            return Err(LoaderError::AlreadyPublished(id.clone()));
        }
        self.results.insert(id.clone(), not_found);
        Ok(true)
    }

    pub fn result_of(&self, id: &BundleId) -> Option<&NotFoundList> {
        self.results.get(id)
    }

    pub fn is_defined(&self, id: &BundleId) -> bool {
        self.defined.contains(id)
    }

    pub fn is_published(&self, id: &BundleId) -> bool {
        self.results.contains_key(id)
    }

    pub fn defined(&self) -> impl Iterator<Item = &BundleId> + '_ {
        self.defined.iter()
    }

    pub fn clear(&mut self) {
        self.defined.clear();
        self.results.clear();
    }
}
