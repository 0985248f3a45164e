//! Path-to-model resolution for the built-in models.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fb_component::{NativeImage, NativeInstance, NativeLoader};
use fb_description::ModelDescription;
use tracing::debug;

use crate::bouncing_ball::{self, BouncingBall};
use crate::clock::{self, Clock};

type Factory = fn(&str, bool) -> Option<Box<dyn NativeInstance>>;

/// A built-in model image: static description plus an instance factory.
pub struct BuiltinImage {
    description: ModelDescription,
    factory: Factory,
}

impl BuiltinImage {
    pub fn bouncing_ball() -> Self {
        Self {
            description: bouncing_ball::description(),
            factory: |name, logging| Some(Box::new(BouncingBall::new(name, logging))),
        }
    }

    pub fn clock() -> Self {
        Self {
            description: clock::description(),
            factory: |name, logging| Some(Box::new(Clock::new(name, logging))),
        }
    }

    /// Describes a bouncing ball but refuses every instantiation.
    pub fn broken() -> Self {
        let mut description = bouncing_ball::description();
        description.model_identifier = "broken".into();
        Self {
            description,
            factory: |_, _| None,
        }
    }

    /// Image for a model name, if one is built in.
    pub fn lookup(model: &str) -> Option<Self> {
        match model {
            "bounce" | "bouncing_ball" => Some(Self::bouncing_ball()),
            "clock" => Some(Self::clock()),
            "broken" => Some(Self::broken()),
            _ => None,
        }
    }
}

impl NativeImage for BuiltinImage {
    fn model_description(&self) -> &ModelDescription {
        &self.description
    }

    fn instantiate(
        &self,
        instance_name: &str,
        guid: &str,
        logging_on: bool,
    ) -> Option<Box<dyn NativeInstance>> {
        if guid != self.description.guid {
            return None;
        }
        (self.factory)(instance_name, logging_on)
    }
}

/// Resolves a path's file stem (`models/bounce.fmu` → `bounce`) to a built-in model.
#[derive(Debug, Default)]
pub struct CatalogLoader {
    loads: AtomicUsize,
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images handed out so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl NativeLoader for CatalogLoader {
    fn load(&self, path: &Path) -> Result<Arc<dyn NativeImage>, String> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("cannot derive a model name from {}", path.display()))?;
        let image = BuiltinImage::lookup(stem).ok_or_else(|| format!("no built-in model named '{stem}'"))?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        debug!(model = stem, path = %path.display(), "resolved built-in model");
        Ok(Arc::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_resolve_to_models() {
        let loader = CatalogLoader::new();
        let image = loader.load(Path::new("/models/bounce.fmu")).unwrap();
        assert_eq!(image.model_description().model_identifier, "bouncing_ball");
        let image = loader.load(Path::new("clock")).unwrap();
        assert_eq!(image.model_description().number_of_continuous_states, 0);
        assert_eq!(loader.loads(), 2);
    }

    #[test]
    fn unknown_stem_fails() {
        let loader = CatalogLoader::new();
        let err = loader.load(Path::new("/models/pendulum.fmu")).err().unwrap();
        assert!(err.contains("pendulum"));
        assert_eq!(loader.loads(), 0);
    }

    #[test]
    fn guid_mismatch_refuses_instantiation() {
        let image = BuiltinImage::bouncing_ball();
        assert!(image.instantiate("b", "{wrong}", false).is_none());
        assert!(image.instantiate("b", bouncing_ball::GUID, false).is_some());
        assert!(BuiltinImage::broken().instantiate("b", bouncing_ball::GUID, false).is_none());
    }
}
