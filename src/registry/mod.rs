//! Provider registry.
//!
//! Static catalog of configured providers, each paired with the adapter that
//! talks to it. The whole table is swapped atomically on reload, so a dispatch
//! that took a snapshot keeps a self-consistent view until it finishes.

mod descriptor;
mod error;
#[cfg(test)]
mod tests;

pub use descriptor::*;
pub use error::*;

use crate::provider::Provider;
use arc_swap::ArcSwap;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A descriptor together with the adapter selected for it.
#[derive(Clone)]
pub struct ProviderEntry {
    pub descriptor: Arc<ProviderDescriptor>,
    pub provider: Arc<dyn Provider>,
}

impl ProviderEntry {
    pub fn new(descriptor: ProviderDescriptor, provider: Arc<dyn Provider>) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// One immutable generation of the catalog.
#[derive(Debug, Default)]
pub struct ProviderTable {
    entries: Vec<ProviderEntry>,
    by_name: HashMap<String, usize>,
    /// model -> entry indices, in registration order
    model_index: HashMap<String, Vec<usize>>,
}

impl ProviderTable {
    /// Build a table, rejecting duplicate names.
    pub fn new(entries: Vec<ProviderEntry>) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut model_index: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if by_name.insert(entry.name().to_string(), idx).is_some() {
                return Err(RegistryError::DuplicateProvider(entry.name().to_string()));
            }
            for model in &entry.descriptor.models {
                model_index.entry(model.clone()).or_default().push(idx);
            }
        }

        Ok(Self {
            entries,
            by_name,
            model_index,
        })
    }

    /// Enabled providers serving `model`, by ascending priority.
    ///
    /// Equal priorities keep registration order.
    pub fn providers_for_model(&self, model: &str) -> Vec<ProviderEntry> {
        let mut matches: Vec<ProviderEntry> = self
            .model_index
            .get(model)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.entries[i])
                    .filter(|e| e.descriptor.enabled)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // sort_by_key is stable
        matches.sort_by_key(|e| e.descriptor.priority);
        matches
    }

    pub fn get(&self, name: &str) -> Option<&ProviderEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Thread-safe provider catalog with atomic whole-table replacement.
///
/// # Examples
///
/// ```
/// use switchyard::registry::{ProviderDescriptor, ProviderRegistry};
///
/// let registry = ProviderRegistry::empty();
/// assert!(registry.providers_for_model("gpt-4o").is_empty());
/// assert!(registry.all_providers().is_empty());
/// # let _ = ProviderDescriptor::new("p", "http://localhost", &["gpt-4o"]);
/// ```
pub struct ProviderRegistry {
    table: ArcSwap<ProviderTable>,
}

impl ProviderRegistry {
    pub fn new(entries: Vec<ProviderEntry>) -> Result<Self, RegistryError> {
        Ok(Self {
            table: ArcSwap::from_pointee(ProviderTable::new(entries)?),
        })
    }

    pub fn empty() -> Self {
        Self {
            table: ArcSwap::from_pointee(ProviderTable::default()),
        }
    }

    /// Current generation of the table.
    pub fn snapshot(&self) -> Arc<ProviderTable> {
        self.table.load_full()
    }

    /// Swap in a new catalog. On error the current table is left untouched.
    pub fn replace(&self, entries: Vec<ProviderEntry>) -> Result<(), RegistryError> {
        let table = ProviderTable::new(entries)?;
        self.table.store(Arc::new(table));
        Ok(())
    }

    /// Enabled providers serving `model`, by ascending priority.
    pub fn providers_for_model(&self, model: &str) -> Vec<ProviderEntry> {
        self.table.load().providers_for_model(model)
    }

    /// Every configured descriptor, enabled or not, in registration order.
    pub fn all_providers(&self) -> Vec<Arc<ProviderDescriptor>> {
        self.table
            .load()
            .entries()
            .iter()
            .map(|e| Arc::clone(&e.descriptor))
            .collect()
    }

    pub fn get(&self, name: &str) -> Result<ProviderEntry, RegistryError> {
        self.table
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ProviderNotFound(name.to_string()))
    }

    /// Models served by at least one enabled provider.
    pub fn models(&self) -> BTreeSet<String> {
        self.table
            .load()
            .entries()
            .iter()
            .filter(|e| e.descriptor.enabled)
            .flat_map(|e| e.descriptor.models.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
