//! fb-description: static model description and variable reference classification.
//!
//! A model description is produced by an external collaborator (the XML
//! parser of the model-interchange archive). This crate only defines the
//! parsed shape and the classification pass run on it at load time:
//!
//! - [`ModelDescription`] / [`VariableDescription`]: parsed static metadata
//! - [`Classification`]: ALL ⊇ START ⊇ EVENT ⊇ CONTINUOUS, plus INPUT and OUTPUT
//!
//! Descriptions can also be read from YAML or JSON, which is how the
//! built-in models and tests describe themselves.

pub mod classify;
pub mod description;
pub mod error;

pub use classify::{Classification, ReferenceSubset};
pub use description::{
    Causality, DeclaredType, DefaultExperiment, ModelDescription, Variability,
    VariableDescription,
};
pub use error::{ClassificationError, DescriptionError, DescriptionResult};

pub fn load_yaml(path: &std::path::Path) -> DescriptionResult<ModelDescription> {
    let content = std::fs::read_to_string(path)?;
    let description: ModelDescription = serde_yaml::from_str(&content)?;
    // Reject malformed variable lists before anyone tries to load them.
    Classification::classify(&description.variables)?;
    Ok(description)
}

pub fn load_json(path: &std::path::Path) -> DescriptionResult<ModelDescription> {
    let content = std::fs::read_to_string(path)?;
    let description: ModelDescription = serde_json::from_str(&content)?;
    Classification::classify(&description.variables)?;
    Ok(description)
}
