//! Native binding families.
//!
//! A backend decides how an adapter obtains and gives back its image and
//! whether the family allows multiple independent copies of a component.
//! The concrete backend is picked once, from the plan's [`BackendKind`].

use std::path::Path;
use std::sync::Arc;

use crate::error::{AdapterError, AdapterResult};
use crate::native::{NativeImage, NativeLoader};
use crate::plan::BackendKind;
use crate::registry::ImageRegistry;

pub trait Backend: Send {
    fn kind(&self) -> BackendKind;

    /// Obtain the image for an already resolved path.
    fn acquire(&mut self, path: &Path) -> AdapterResult<Arc<dyn NativeImage>>;

    /// Give back what [`Backend::acquire`] obtained for `path`.
    fn release(&mut self, path: &Path);

    /// An unbound backend of the same family for a duplicated adapter.
    fn duplicate(&self) -> AdapterResult<Box<dyn Backend>>;
}

/// Build the backend selected by a plan.
pub fn for_kind(
    kind: BackendKind,
    loader: Arc<dyn NativeLoader>,
    registry: Arc<ImageRegistry>,
) -> Box<dyn Backend> {
    match kind {
        BackendKind::Shared => Box::new(SharedImageBackend { loader, registry }),
        BackendKind::Isolated => Box::new(IsolatedBackend { loader }),
    }
}

/// Images shared through an [`ImageRegistry`]; one instance per image is
/// assumed by the family, so duplication is refused.
pub struct SharedImageBackend {
    loader: Arc<dyn NativeLoader>,
    registry: Arc<ImageRegistry>,
}

impl Backend for SharedImageBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Shared
    }

    fn acquire(&mut self, path: &Path) -> AdapterResult<Arc<dyn NativeImage>> {
        self.registry.acquire(path, self.loader.as_ref())
    }

    fn release(&mut self, path: &Path) {
        self.registry.release(path);
    }

    fn duplicate(&self) -> AdapterResult<Box<dyn Backend>> {
        Err(AdapterError::NotSupported {
            what: "duplication of shared-image components",
        })
    }
}

/// A private image per adapter, never registered.
pub struct IsolatedBackend {
    loader: Arc<dyn NativeLoader>,
}

impl Backend for IsolatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Isolated
    }

    fn acquire(&mut self, path: &Path) -> AdapterResult<Arc<dyn NativeImage>> {
        self.loader.load(path).map_err(|reason| AdapterError::Load {
            path: path.to_path_buf(),
            reason,
        })
    }

    // The adapter drops its image handle; nothing else to give back.
    fn release(&mut self, _path: &Path) {}

    fn duplicate(&self) -> AdapterResult<Box<dyn Backend>> {
        Ok(Box::new(IsolatedBackend {
            loader: self.loader.clone(),
        }))
    }
}
