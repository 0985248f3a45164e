//! Declarative component plan (inbound configuration).

use std::path::{Path, PathBuf};

use fb_core::{FbError, ensure_positive};
use serde::{Deserialize, Serialize};

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    #[error("Invalid plan: {what}")]
    Validation { what: String },

    #[error("Numeric error: {0}")]
    Numeric(#[from] FbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Native binding family used for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// One image per resolved path, shared by every adapter in the process.
    #[default]
    Shared,
    /// A private image per adapter; allows duplication.
    Isolated,
}

/// Everything needed to construct one adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPlan {
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,
    #[serde(default)]
    pub tolerance_controlled: bool,
    #[serde(default)]
    pub logging_enabled: bool,
    /// Return from event update after every internal event iteration.
    #[serde(default)]
    pub intermediate_results: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    #[serde(default)]
    pub backend: BackendKind,
}

fn default_relative_tolerance() -> f64 {
    1e-6
}

impl ComponentPlan {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            relative_tolerance: default_relative_tolerance(),
            tolerance_controlled: false,
            logging_enabled: false,
            intermediate_results: false,
            working_directory: None,
            backend: BackendKind::default(),
        }
    }

    pub fn with_tolerance(mut self, relative_tolerance: f64, controlled: bool) -> Self {
        self.relative_tolerance = relative_tolerance;
        self.tolerance_controlled = controlled;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.name.trim().is_empty() {
            return Err(PlanError::Validation {
                what: "component name is empty".to_string(),
            });
        }
        if self.path.as_os_str().is_empty() {
            return Err(PlanError::Validation {
                what: format!("component '{}' has an empty path", self.name),
            });
        }
        ensure_positive(self.relative_tolerance, "relative_tolerance")?;
        Ok(())
    }
}

pub fn load_plan_yaml(path: &Path) -> PlanResult<ComponentPlan> {
    let content = std::fs::read_to_string(path)?;
    let plan: ComponentPlan = serde_yaml::from_str(&content)?;
    plan.validate()?;
    Ok(plan)
}

pub fn save_plan_yaml(path: &Path, plan: &ComponentPlan) -> PlanResult<()> {
    plan.validate()?;
    let content = serde_yaml::to_string(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_plan_json(path: &Path) -> PlanResult<ComponentPlan> {
    let content = std::fs::read_to_string(path)?;
    let plan: ComponentPlan = serde_json::from_str(&content)?;
    plan.validate()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults() {
        let plan: ComponentPlan = serde_yaml::from_str("name: bounce\npath: bounce.fmu\n").unwrap();
        assert_eq!(plan.relative_tolerance, 1e-6);
        assert!(!plan.tolerance_controlled);
        assert!(!plan.intermediate_results);
        assert_eq!(plan.backend, BackendKind::Shared);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn backend_tag_parses() {
        let plan: ComponentPlan =
            serde_yaml::from_str("name: b\npath: b.fmu\nbackend: isolated\n").unwrap();
        assert_eq!(plan.backend, BackendKind::Isolated);
    }

    #[test]
    fn validation_rejects_bad_plans() {
        assert!(matches!(
            ComponentPlan::new(" ", "x.fmu").validate(),
            Err(PlanError::Validation { .. })
        ));
        assert!(matches!(
            ComponentPlan::new("x", "").validate(),
            Err(PlanError::Validation { .. })
        ));
        assert!(matches!(
            ComponentPlan::new("x", "x.fmu")
                .with_tolerance(0.0, true)
                .validate(),
            Err(PlanError::Numeric(FbError::InvalidArg { .. }))
        ));
        assert!(matches!(
            ComponentPlan::new("x", "x.fmu")
                .with_tolerance(f64::NAN, true)
                .validate(),
            Err(PlanError::Numeric(FbError::NonFinite { .. }))
        ));
    }

    #[test]
    fn yaml_save_then_load() {
        let plan = ComponentPlan::new("bounce", "models/bounce.fmu").with_tolerance(1e-8, true);
        let path = std::env::temp_dir().join("fb_component_plan_save_load.yaml");
        save_plan_yaml(&path, &plan).unwrap();
        assert_eq!(load_plan_yaml(&path).unwrap(), plan);
    }
}
