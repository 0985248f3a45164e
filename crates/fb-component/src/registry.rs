//! Process-wide registry of shared native images.
//!
//! Adapters whose plans resolve to the same path share one loaded image. The
//! registry counts referrers per path and drops the image when the last one
//! releases it. Only registry mutation is locked; calls into individual
//! native instances never touch the lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::info;

use crate::error::{AdapterError, AdapterResult};
use crate::native::{NativeImage, NativeLoader};

struct RegistryEntry {
    image: Arc<dyn NativeImage>,
    referrers: usize,
}

/// Reference-counted map from resolved path to loaded image.
#[derive(Default)]
pub struct ImageRegistry {
    entries: Mutex<HashMap<PathBuf, RegistryEntry>>,
}

static GLOBAL: OnceLock<Arc<ImageRegistry>> = OnceLock::new();

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> Arc<ImageRegistry> {
        GLOBAL.get_or_init(|| Arc::new(ImageRegistry::new())).clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, RegistryEntry>> {
        // The map holds no invariants a panicking holder could break halfway.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reuse the image registered for `path`, or load and register it.
    ///
    /// The loader runs under the registry lock so two adapters racing on the
    /// same path never load the image twice.
    pub fn acquire(
        &self,
        path: &Path,
        loader: &dyn NativeLoader,
    ) -> AdapterResult<Arc<dyn NativeImage>> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(path) {
            entry.referrers += 1;
            return Ok(entry.image.clone());
        }

        let image = loader.load(path).map_err(|reason| AdapterError::Load {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), "loaded native image");
        entries.insert(
            path.to_path_buf(),
            RegistryEntry {
                image: image.clone(),
                referrers: 1,
            },
        );
        Ok(image)
    }

    /// Drop one reference; returns the number of referrers left.
    ///
    /// Releasing an unknown path is a no-op.
    pub fn release(&self, path: &Path) -> usize {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(path) else {
            return 0;
        };
        entry.referrers -= 1;
        let left = entry.referrers;
        if left == 0 {
            entries.remove(path);
            info!(path = %path.display(), "released native image");
        }
        left
    }

    pub fn ref_count(&self, path: &Path) -> usize {
        self.lock().get(path).map_or(0, |e| e.referrers)
    }

    /// Number of distinct images currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeInstance;
    use fb_description::ModelDescription;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EmptyImage(ModelDescription);

    impl NativeImage for EmptyImage {
        fn model_description(&self) -> &ModelDescription {
            &self.0
        }
        fn instantiate(&self, _: &str, _: &str, _: bool) -> Option<Box<dyn NativeInstance>> {
            None
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
    }

    impl NativeLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<Arc<dyn NativeImage>, String> {
            if path.ends_with("missing.fmu") {
                return Err("no such model".to_string());
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EmptyImage(ModelDescription {
                model_name: "empty".into(),
                model_identifier: "empty".into(),
                guid: "{empty}".into(),
                number_of_continuous_states: 0,
                number_of_event_indicators: 0,
                default_experiment: None,
                variables: vec![],
            })))
        }
    }

    #[test]
    fn shared_path_loads_once() {
        let registry = ImageRegistry::new();
        let loader = CountingLoader::default();
        let path = Path::new("/models/a.fmu");

        let first = registry.acquire(path, &loader).unwrap();
        let second = registry.acquire(path, &loader).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(registry.ref_count(path), 2);

        assert_eq!(registry.release(path), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.release(path), 0);
        assert!(registry.is_empty());

        // a fresh acquire after full release loads again
        let _third = registry.acquire(path, &loader).unwrap();
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn distinct_paths_are_independent() {
        let registry = ImageRegistry::new();
        let loader = CountingLoader::default();
        registry.acquire(Path::new("/m/a.fmu"), &loader).unwrap();
        registry.acquire(Path::new("/m/b.fmu"), &loader).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ref_count(Path::new("/m/a.fmu")), 1);
    }

    #[test]
    fn failed_load_registers_nothing() {
        let registry = ImageRegistry::new();
        let loader = CountingLoader::default();
        let err = registry
            .acquire(Path::new("/m/missing.fmu"), &loader)
            .err()
            .unwrap();
        assert!(matches!(err, AdapterError::Load { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn release_of_unknown_path_is_noop() {
        let registry = ImageRegistry::new();
        assert_eq!(registry.release(Path::new("/nowhere.fmu")), 0);
    }
}
